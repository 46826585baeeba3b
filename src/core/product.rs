use chrono::{DateTime, Local};
use serde::Deserialize;

/// Publicly listed energy product.
#[derive(Clone, Debug, Deserialize)]
pub struct Product {
    pub code: String,
    pub display_name: String,

    #[serde(default)]
    pub full_name: String,

    #[serde(default)]
    pub brand: String,

    pub is_variable: bool,

    #[serde(default)]
    pub is_green: bool,

    pub available_from: Option<DateTime<Local>>,
    pub available_to: Option<DateTime<Local>>,
}
