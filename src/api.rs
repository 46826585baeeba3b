pub mod octopus;

use chrono::{DateTime, Local};

use crate::{
    core::{
        account::Account,
        consumption::ConsumptionInterval,
        interval::Interval,
        meter::MeterId,
        product::Product,
        tariff::{TariffCode, TariffRate},
    },
    prelude::*,
};

/// Upstream source of the account, consumption, and tariff data.
///
/// Implementations return the records ordered by start, hiding any pagination.
pub trait Remote {
    fn fetch_account(&self) -> Result<Account>;

    fn fetch_consumption(
        &self,
        meter: &MeterId,
        interval: Interval,
    ) -> Result<Vec<ConsumptionInterval>>;

    /// Fetch the unit rates of the tariff, the product is taken from the tariff code.
    fn fetch_tariff_rates(&self, code: &TariffCode, interval: Interval) -> Result<Vec<TariffRate>>;

    fn fetch_products(&self, available_at: Option<DateTime<Local>>) -> Result<Vec<Product>>;
}
