//! Contiguous timelines out of sparse stored rows.

use chrono::TimeDelta;

use crate::{
    core::{consumption::ConsumptionInterval, interval::Interval, tariff::TariffRate},
    error::ReconcileError,
    prelude::*,
    quantity::{Zero, energy::KilowattHours},
};

/// Reconstruct the consumption timeline, filling the missing readings with zero usage.
///
/// Leading and trailing holes are not filled.
#[instrument(skip_all, fields(requested = %requested))]
pub fn consumption(
    requested: Interval,
    rows: impl IntoIterator<Item = ConsumptionInterval>,
    width: TimeDelta,
) -> Result<Vec<ConsumptionInterval>, ReconcileError> {
    if width <= TimeDelta::zero() {
        return Err(ReconcileError::NonPositiveWidth(width));
    }
    let timeline = join(requested, rows, |row| row.interval, |gap, timeline| {
        warn!(%gap, "missing readings, inserting zero usage intervals");
        let mut start = gap.start;
        while start < gap.end {
            let end = (start + width).min(gap.end);
            timeline.push(ConsumptionInterval::new(Interval::new(start, end), KilowattHours::ZERO));
            start = end;
        }
        Ok(())
    })?;
    info!(len = timeline.len(), "reconstructed consumption");
    Ok(timeline)
}

/// Reconstruct the tariff timeline, which must not have holes.
#[instrument(skip_all, fields(requested = %requested))]
pub fn tariff(
    requested: Interval,
    rows: impl IntoIterator<Item = TariffRate>,
) -> Result<Vec<TariffRate>, ReconcileError> {
    let timeline = join(requested, rows, |row| row.interval, |gap, _| {
        Err(ReconcileError::TariffGap { after: gap.start, before: gap.end })
    })?;
    info!(len = timeline.len(), "reconstructed tariff rates");
    Ok(timeline)
}

/// Walk the ordered rows, calling `on_gap` for each hole between the consecutive rows.
fn join<T>(
    requested: Interval,
    rows: impl IntoIterator<Item = T>,
    interval_of: impl Fn(&T) -> Interval,
    mut on_gap: impl FnMut(Interval, &mut Vec<T>) -> Result<(), ReconcileError>,
) -> Result<Vec<T>, ReconcileError> {
    let mut timeline = Vec::new();
    let mut last_end = None;
    for row in rows {
        let interval = interval_of(&row);
        if interval.end <= interval.start {
            return Err(ReconcileError::InvertedInterval(interval));
        }
        if let Some(last_end) = last_end {
            if interval.start < last_end {
                return Err(ReconcileError::OverlappingIntervals { previous_end: last_end, interval });
            }
            if interval.start > last_end {
                on_gap(Interval::new(last_end, interval.start), &mut timeline)?;
            }
        }
        timeline.push(row);
        last_end = Some(interval.end);
    }
    if timeline.is_empty() {
        return Err(ReconcileError::NoData { requested });
    }
    Ok(timeline)
}
