use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::{
    core::{consumption::ConsumptionInterval, interval::Interval, tariff::TariffRate},
    quantity::{energy::KilowattHours, rate::KilowattHourRate},
};

/// Paginated list response.
#[derive(Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<usize>,

    /// Absolute URL of the next page.
    pub next: Option<String>,

    pub results: Vec<T>,
}

#[derive(Deserialize)]
pub struct Reading {
    pub consumption: f64,
    pub interval_start: DateTime<Local>,
    pub interval_end: DateTime<Local>,
}

impl From<Reading> for ConsumptionInterval {
    fn from(reading: Reading) -> Self {
        Self::new(
            Interval::new(reading.interval_start, reading.interval_end),
            KilowattHours(reading.consumption),
        )
    }
}

#[derive(Deserialize)]
pub struct UnitRate {
    pub value_inc_vat: f64,
    pub valid_from: DateTime<Local>,

    /// Open-ended when the rate stays in effect until further notice.
    pub valid_to: Option<DateTime<Local>>,
}

impl UnitRate {
    /// Convert into the closed rate interval, cutting the open end at the horizon.
    pub fn into_rate(self, horizon: DateTime<Local>) -> TariffRate {
        TariffRate::new(
            Interval::new(self.valid_from, self.valid_to.unwrap_or(horizon)),
            KilowattHourRate(self.value_inc_vat),
        )
    }
}
