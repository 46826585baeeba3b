use chrono::NaiveDate;
use clap::Parser;

use crate::{
    api::Remote,
    cli::{api::ApiArgs, start_of},
    prelude::*,
    tables::build_products_table,
};

#[derive(Parser)]
pub struct ProductsArgs {
    /// Only list the products available at the date.
    #[clap(long = "available-at")]
    available_at: Option<NaiveDate>,
}

impl ProductsArgs {
    pub fn run(self, api: &ApiArgs) -> Result {
        let available_at = self.available_at.map(start_of).transpose()?;
        let mut products = api.new_client().fetch_products(available_at)?;
        products.sort_by(|lhs, rhs| lhs.code.cmp(&rhs.code));
        info!(n_products = products.len(), "fetched");
        println!("{}", build_products_table(&products));
        Ok(())
    }
}
