use chrono::TimeDelta;

use crate::{core::interval::Interval, quantity::energy::KilowattHours};

/// Canonical metering granularity.
pub const HALF_HOUR: TimeDelta = TimeDelta::minutes(30);

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConsumptionInterval {
    pub interval: Interval,
    pub consumption: KilowattHours,
}

impl ConsumptionInterval {
    pub const fn new(interval: Interval, consumption: KilowattHours) -> Self {
        Self { interval, consumption }
    }

    pub const fn with_consumption(mut self, consumption: KilowattHours) -> Self {
        self.consumption = consumption;
        self
    }
}
