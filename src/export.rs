use std::io::Write;

use crate::{
    core::{accounting::Cost, battery::BatteryTelemetry},
    prelude::*,
};

const HEADER: [&str; 5] = ["start", "end", "consumption_kwh", "rate_pence_per_kwh", "cost_pence"];
const BATTERY_HEADER: [&str; 3] = ["battery_charge_kwh", "battery_delta_kwh", "battery_full"];

/// Write the priced ledger as CSV, one row per interval.
///
/// The battery columns get appended when the telemetry is given.
#[instrument(skip_all, fields(n_intervals = cost.intervals.len()))]
pub fn write_ledger<W: Write>(
    writer: W,
    cost: &Cost,
    telemetry: Option<&[BatteryTelemetry]>,
) -> Result {
    if let Some(telemetry) = telemetry {
        ensure!(
            telemetry.len() == cost.intervals.len(),
            "{} telemetry records for {} intervals",
            telemetry.len(),
            cost.intervals.len(),
        );
    }

    let mut writer = csv::Writer::from_writer(writer);
    if telemetry.is_some() {
        writer.write_record(HEADER.iter().chain(&BATTERY_HEADER))?;
    } else {
        writer.write_record(HEADER)?;
    }
    for (index, item) in cost.intervals.iter().enumerate() {
        let mut record = vec![
            item.interval.start.to_rfc3339(),
            item.interval.end.to_rfc3339(),
            item.consumption.0.to_string(),
            item.rate.0.to_string(),
            item.cost.0.to_string(),
        ];
        if let Some(telemetry) = telemetry.map(|telemetry| telemetry[index]) {
            record.push(telemetry.charge.0.to_string());
            record.push(telemetry.delta.0.to_string());
            record.push(telemetry.is_full.to_string());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    info!("exported");
    Ok(())
}
