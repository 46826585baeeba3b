use crate::{
    core::accounting::Cost,
    quantity::{Zero, cost::Pence, energy::KilowattHours, rate::KilowattHourRate},
};

/// Standing charge of the typical Octopus tariff, pence per day including VAT.
pub const DEFAULT_STANDING_CHARGE: Pence = Pence(54.83);

/// Bill-style totals of a priced period.
#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct Summary {
    pub energy: Pence,
    pub standing: Pence,
    pub total: Pence,
    pub days: f64,
    pub per_day: Option<Pence>,

    /// Total including the standing charge divided by the consumption.
    pub effective_rate: Option<KilowattHourRate>,
}

impl Summary {
    /// Summarize the cost with the standing charge accrued over the covered (fractional) days.
    pub fn new(cost: &Cost, standing_charge: Pence) -> Self {
        let days = cost
            .interval()
            .map_or(0.0, |interval| interval.duration().as_seconds_f64() / 86400.0);
        let standing = standing_charge * days;
        let total = cost.total_cost + standing;
        Self {
            energy: cost.total_cost,
            standing,
            total,
            days,
            per_day: (days > 0.0).then(|| total / days),
            effective_rate: (cost.total_consumption > KilowattHours::ZERO)
                .then(|| total / cost.total_consumption),
        }
    }
}
