use crate::{
    core::{
        battery::{Battery, ChargeWindow},
        consumption::ConsumptionInterval,
    },
    prelude::*,
    quantity::{Zero, energy::KilowattHours},
};

/// Battery state after an interval.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BatteryTelemetry {
    /// Residual energy after the interval.
    pub charge: KilowattHours,

    /// Positive while charging, negative while discharging.
    pub delta: KilowattHours,

    pub is_full: bool,
}

/// Rewrites the consumption as if the battery charged within the window and discharged outside it.
///
/// The state is carried across [`LoadShifter::apply`] calls, use a fresh shifter for every run.
#[must_use]
pub struct LoadShifter {
    battery: Battery,
    window: ChargeWindow,
    charge: KilowattHours,
}

impl LoadShifter {
    /// Start with the empty battery.
    pub const fn new(battery: Battery, window: ChargeWindow) -> Self {
        Self { battery, window, charge: KilowattHours::ZERO }
    }

    #[must_use]
    pub const fn charge(&self) -> KilowattHours {
        self.charge
    }

    pub fn apply(&mut self, item: &ConsumptionInterval) -> (ConsumptionInterval, BatteryTelemetry) {
        let hours = item.interval.hours();
        let delta = if self.window.contains(item.interval.start) {
            let headroom = self.battery.capacity - self.charge;
            let delta = (self.battery.charge_rate * hours).min(headroom).max(KilowattHours::ZERO);
            if delta == headroom {
                // Exactly full:
                self.charge = self.battery.capacity;
            } else {
                self.charge += delta;
            }
            delta
        } else {
            let mut delta = self.charge.min(item.consumption).max(KilowattHours::ZERO);
            if let Some(discharge_rate) = self.battery.discharge_rate {
                delta = delta.min(discharge_rate * hours);
            }
            self.charge -= delta;
            -delta
        };
        let telemetry = BatteryTelemetry {
            charge: self.charge,
            delta,
            is_full: self.charge == self.battery.capacity,
        };
        (item.with_consumption(item.consumption + delta), telemetry)
    }

    /// Apply the shifter to the entire timeline.
    #[instrument(skip_all, fields(n_intervals = consumption.len()))]
    pub fn run(mut self, consumption: &[ConsumptionInterval]) -> LoadShift {
        let mut summary = LoadShiftSummary::default();
        let (consumption, telemetry): (Vec<_>, Vec<_>) = consumption
            .iter()
            .map(|item| {
                let (item, telemetry) = self.apply(item);
                if telemetry.delta > KilowattHours::ZERO {
                    summary.charged += telemetry.delta;
                } else {
                    summary.discharged -= telemetry.delta;
                }
                if telemetry.is_full {
                    summary.n_full += 1;
                }
                (item, telemetry)
            })
            .unzip();
        summary.final_charge = self.charge;
        info!(
            charged = %summary.charged,
            discharged = %summary.discharged,
            n_full = summary.n_full,
            "simulated",
        );
        LoadShift { consumption, telemetry, summary }
    }
}

#[must_use]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LoadShiftSummary {
    pub charged: KilowattHours,
    pub discharged: KilowattHours,

    /// Number of intervals which ended with the full battery.
    pub n_full: usize,

    pub final_charge: KilowattHours,
}

/// Shifted consumption along with the per-interval telemetry.
#[must_use]
pub struct LoadShift {
    pub consumption: Vec<ConsumptionInterval>,
    pub telemetry: Vec<BatteryTelemetry>,
    pub summary: LoadShiftSummary,
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Local, TimeDelta, TimeZone};

    use super::*;
    use crate::{core::interval::Interval, quantity::power::Kilowatts};

    fn at(hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 15, hour, 0, 0).unwrap()
    }

    fn hour_at(hour: u32, consumption: f64) -> ConsumptionInterval {
        ConsumptionInterval::new(
            Interval::new(at(hour), at(hour) + TimeDelta::hours(1)),
            KilowattHours(consumption),
        )
    }

    fn battery() -> Battery {
        Battery::builder().capacity(KilowattHours(10.0)).charge_rate(Kilowatts(5.0)).build()
    }

    fn night() -> ChargeWindow {
        ChargeWindow { start: 0.0, end: 5.0 }
    }

    #[test]
    fn charges_then_discharges() {
        let mut shifter = LoadShifter::new(battery(), night());

        let (item, telemetry) = shifter.apply(&hour_at(2, 1.0));
        assert_eq!(item.consumption, KilowattHours(6.0));
        assert_eq!(telemetry.charge, KilowattHours(5.0));
        assert_eq!(telemetry.delta, KilowattHours(5.0));
        assert!(!telemetry.is_full);

        let (item, telemetry) = shifter.apply(&hour_at(12, 4.0));
        assert_eq!(item.consumption, KilowattHours(0.0));
        assert_eq!(telemetry.charge, KilowattHours(1.0));
        assert_eq!(telemetry.delta, KilowattHours(-4.0));
    }

    #[test]
    fn charging_is_clamped_by_headroom() {
        let mut shifter = LoadShifter::new(battery(), night());
        shifter.apply(&hour_at(0, 0.0));
        shifter.apply(&hour_at(1, 0.0));
        let (item, telemetry) = shifter.apply(&hour_at(2, 0.5));
        assert_eq!(item.consumption, KilowattHours(0.5));
        assert_eq!(telemetry.delta, KilowattHours::ZERO);
        assert!(telemetry.is_full);
    }

    #[test]
    fn half_hour_charges_half_the_rate() {
        let mut shifter = LoadShifter::new(battery(), night());
        let item = ConsumptionInterval::new(
            Interval::new(at(1), at(1) + TimeDelta::minutes(30)),
            KilowattHours(0.5),
        );
        let (item, telemetry) = shifter.apply(&item);
        assert_eq!(telemetry.delta, KilowattHours(2.5));
        assert_eq!(item.consumption, KilowattHours(3.0));
    }

    #[test]
    fn discharge_is_limited_by_charge() {
        let mut shifter = LoadShifter::new(battery(), night());
        shifter.apply(&hour_at(4, 0.0));
        let (item, telemetry) = shifter.apply(&hour_at(18, 7.0));
        assert_eq!(item.consumption, KilowattHours(2.0));
        assert_eq!(telemetry.charge, KilowattHours::ZERO);
    }

    #[test]
    fn discharge_rate_caps_discharge() {
        let battery = Battery::builder()
            .capacity(KilowattHours(10.0))
            .charge_rate(Kilowatts(5.0))
            .discharge_rate(Kilowatts(1.5))
            .build();
        let mut shifter = LoadShifter::new(battery, night());
        shifter.apply(&hour_at(4, 0.0));
        let (item, telemetry) = shifter.apply(&hour_at(18, 4.0));
        assert_eq!(telemetry.delta, KilowattHours(-1.5));
        assert_eq!(item.consumption, KilowattHours(2.5));
        assert_eq!(telemetry.charge, KilowattHours(3.5));
    }

    #[test]
    fn run_summarizes() {
        let consumption = [hour_at(1, 0.0), hour_at(2, 0.0), hour_at(3, 1.0), hour_at(18, 3.0)];
        let shift = LoadShifter::new(battery(), night()).run(&consumption);
        assert_eq!(shift.consumption.len(), 4);
        assert_eq!(shift.telemetry.len(), 4);
        assert_eq!(shift.summary.charged, KilowattHours(10.0));
        assert_eq!(shift.summary.discharged, KilowattHours(3.0));
        assert_eq!(shift.summary.n_full, 2);
        assert_eq!(shift.summary.final_charge, KilowattHours(7.0));
    }

    #[test]
    fn every_run_starts_empty() {
        let consumption = [hour_at(2, 0.0)];
        let first = LoadShifter::new(battery(), night()).run(&consumption);
        let second = LoadShifter::new(battery(), night()).run(&consumption);
        assert_eq!(first.summary, second.summary);
    }
}
