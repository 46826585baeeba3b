use clap::Parser;

use crate::{
    core::battery::{Battery, ChargeWindow},
    quantity::{energy::KilowattHours, power::Kilowatts},
};

/// Hypothetical battery to shift the load with.
#[derive(Parser)]
pub struct BatteryArgs {
    #[clap(
        long = "battery-capacity",
        env = "BATTERY_CAPACITY",
        requires_all = ["charge_rate", "window"],
    )]
    capacity: Option<KilowattHours>,

    /// Charging power in kilowatts.
    #[clap(long = "battery-rate", env = "BATTERY_RATE", requires = "capacity")]
    charge_rate: Option<Kilowatts>,

    /// Local hours to charge within, for example: `23-4.5`.
    #[clap(long = "battery-window", env = "BATTERY_WINDOW", requires = "capacity")]
    window: Option<ChargeWindow>,

    /// Discharging power in kilowatts, unlimited by default.
    #[clap(long = "battery-discharge-rate", env = "BATTERY_DISCHARGE_RATE", requires = "capacity")]
    discharge_rate: Option<Kilowatts>,
}

impl BatteryArgs {
    pub fn battery(&self) -> Option<(Battery, ChargeWindow)> {
        let battery = Battery::builder()
            .capacity(self.capacity?)
            .charge_rate(self.charge_rate?)
            .maybe_discharge_rate(self.discharge_rate)
            .build();
        Some((battery, self.window?))
    }
}
