use clap::Parser;
use itertools::Itertools;

use crate::{
    core::{
        account::{Account, ElectricityMeterPoint, Property},
        meter::MeterId,
    },
    prelude::*,
};

/// Meter selection, the first meter on the account by default.
#[derive(Parser)]
pub struct MeterArgs {
    /// Meter point administration number.
    #[clap(long = "mpan", env = "OCTOPUS_MPAN")]
    mpan: Option<String>,

    #[clap(long = "serial", env = "OCTOPUS_SERIAL")]
    serial: Option<String>,
}

impl MeterArgs {
    pub fn select<'a>(
        &self,
        account: &'a Account,
    ) -> Result<(&'a Property, &'a ElectricityMeterPoint, MeterId)> {
        account
            .meters()
            .find(|(_, _, meter)| {
                self.mpan.as_ref().is_none_or(|mpan| mpan == &meter.mpan)
                    && self.serial.as_ref().is_none_or(|serial| serial == &meter.serial)
            })
            .with_context(|| {
                let available = account.meters().map(|(_, _, meter)| meter).join(", ");
                format!("no matching meter on account `{}`, available: {available}", account.number)
            })
    }
}
