mod shifter;
mod window;

use bon::Builder;

pub use self::{
    shifter::{BatteryTelemetry, LoadShift, LoadShiftSummary, LoadShifter},
    window::ChargeWindow,
};
use crate::quantity::{energy::KilowattHours, power::Kilowatts};

/// Hypothetical home battery.
#[must_use]
#[derive(Copy, Clone, Debug, Builder)]
pub struct Battery {
    pub capacity: KilowattHours,

    /// Maximum charging power.
    pub charge_rate: Kilowatts,

    /// Maximum discharging power, unlimited when absent.
    pub discharge_rate: Option<Kilowatts>,
}
