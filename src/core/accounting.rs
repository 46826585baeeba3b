use crate::{
    core::{consumption::ConsumptionInterval, interval::Interval, tariff::TariffRate},
    error::ReconcileError,
    prelude::*,
    quantity::{
        Zero,
        cost::Pence,
        energy::KilowattHours,
        rate::KilowattHourRate,
    },
};

/// Unit price lookup for consecutive consumption intervals.
pub trait RateSource {
    /// Get the unit price for the interval.
    ///
    /// Intervals must be requested in ascending order.
    fn rate_for(&mut self, interval: Interval) -> Result<KilowattHourRate, ReconcileError>;
}

/// The same unit price all day long.
#[derive(Copy, Clone, Debug)]
pub struct FlatRate(pub KilowattHourRate);

impl RateSource for FlatRate {
    fn rate_for(&mut self, _interval: Interval) -> Result<KilowattHourRate, ReconcileError> {
        Ok(self.0)
    }
}

/// Monotonic position within the ordered tariff timeline.
///
/// The position never moves backwards, so pricing `n` consumption intervals against `m` tariff
/// entries takes `O(n + m)`.
pub struct TariffCursor<'a> {
    rates: &'a [TariffRate],
    position: usize,
}

impl<'a> TariffCursor<'a> {
    pub const fn new(rates: &'a [TariffRate]) -> Self {
        Self { rates, position: 0 }
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Find the tariff entry which fully covers the interval.
    pub fn seek(&mut self, interval: Interval) -> Result<&'a TariffRate, ReconcileError> {
        while self.rates.get(self.position).is_some_and(|rate| rate.interval.end <= interval.start) {
            self.position += 1;
        }
        let Some(rate) = self.rates.get(self.position) else {
            return Err(ReconcileError::TariffExhausted { interval });
        };
        if rate.interval.start > interval.end {
            return Err(ReconcileError::TariffCoverage { interval, next: rate.interval });
        }
        if !rate.interval.covers(interval) {
            return Err(ReconcileError::MisalignedIntervals {
                consumption: interval,
                tariff: rate.interval,
            });
        }
        Ok(rate)
    }
}

impl RateSource for TariffCursor<'_> {
    fn rate_for(&mut self, interval: Interval) -> Result<KilowattHourRate, ReconcileError> {
        Ok(self.seek(interval)?.unit_price)
    }
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntervalCost {
    pub interval: Interval,
    pub consumption: KilowattHours,
    pub rate: KilowattHourRate,
    pub cost: Pence,
}

/// Priced consumption ledger.
#[must_use]
#[derive(Clone, Debug)]
pub struct Cost {
    pub total_cost: Pence,
    pub total_consumption: KilowattHours,
    pub intervals: Vec<IntervalCost>,
}

impl Cost {
    /// Price every consumption interval.
    ///
    /// The very first failure aborts the computation.
    #[instrument(skip_all, fields(n_intervals = consumption.len()))]
    pub fn try_compute(
        consumption: &[ConsumptionInterval],
        rates: &mut impl RateSource,
    ) -> Result<Self, ReconcileError> {
        let mut total_cost = Pence::ZERO;
        let mut total_consumption = KilowattHours::ZERO;
        let intervals = consumption
            .iter()
            .map(|item| {
                let rate = rates.rate_for(item.interval)?;
                let cost = item.consumption * rate;
                total_cost += cost;
                total_consumption += item.consumption;
                Ok(IntervalCost { interval: item.interval, consumption: item.consumption, rate, cost })
            })
            .collect::<Result<Vec<_>, ReconcileError>>()?;
        debug!(%total_cost, %total_consumption, "computed");
        Ok(Self { total_cost, total_consumption, intervals })
    }

    /// Overall period, if there is anything priced.
    #[must_use]
    pub fn interval(&self) -> Option<Interval> {
        let first = self.intervals.first()?;
        let last = self.intervals.last()?;
        Some(Interval::new(first.interval.start, last.interval.end))
    }

    /// Average unit price weighted by consumption.
    #[must_use]
    pub fn effective_rate(&self) -> Option<KilowattHourRate> {
        (self.total_consumption != KilowattHours::ZERO)
            .then(|| self.total_cost / self.total_consumption)
    }
}
