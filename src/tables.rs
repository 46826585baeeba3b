use chrono::{DateTime, Local};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{
        accounting::Cost,
        battery::{BatteryTelemetry, LoadShiftSummary},
        product::Product,
        summary::Summary,
    },
    quantity::{Zero, cost::Pence, energy::KilowattHours},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

fn format_date(at: Option<DateTime<Local>>) -> String {
    at.map_or_else(String::new, |at| at.format("%F").to_string())
}

fn pounds(pence: Pence) -> String {
    format!("£{:.2}", pence.pounds())
}

pub fn build_ledger_table(cost: &Cost, telemetry: Option<&[BatteryTelemetry]>) -> Table {
    let mean_rate = cost.effective_rate().unwrap_or_default();

    let mut table = new_table();
    let mut header = vec!["Date", "Start", "End", "Consumption", "Rate", "Cost"];
    if telemetry.is_some() {
        header.extend(["Charge", "Delta"]);
    }
    table.set_header(header);

    for (index, item) in cost.intervals.iter().enumerate() {
        let mut row = vec![
            Cell::new(item.interval.start.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(item.interval.start.format("%H:%M")),
            Cell::new(item.interval.end.format("%H:%M")).add_attribute(Attribute::Dim),
            Cell::new(item.consumption).set_alignment(CellAlignment::Right),
            Cell::new(item.rate)
                .set_alignment(CellAlignment::Right)
                .fg(if item.rate > mean_rate { Color::Red } else { Color::Green }),
            Cell::new(item.cost).set_alignment(CellAlignment::Right),
        ];
        if let Some(telemetry) = telemetry.and_then(|telemetry| telemetry.get(index)) {
            row.push(
                Cell::new(telemetry.charge)
                    .set_alignment(CellAlignment::Right)
                    .fg(if telemetry.is_full { Color::Green } else { Color::Reset }),
            );
            row.push(Cell::new(telemetry.delta).set_alignment(CellAlignment::Right).fg(
                if telemetry.delta > KilowattHours::ZERO {
                    Color::DarkYellow
                } else if telemetry.delta < KilowattHours::ZERO {
                    Color::Cyan
                } else {
                    Color::Reset
                },
            ));
        }
        table.add_row(row);
    }
    table
}

/// Compare the bill of every scenario side by side.
pub fn build_summary_table(scenarios: &[(&str, &Cost, Summary)]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Scenario",
        "Consumption",
        "Energy",
        "Standing",
        "Total",
        "Days",
        "Per day",
        "Effective",
    ]);
    for (name, cost, summary) in scenarios {
        table.add_row(vec![
            Cell::new(name).add_attribute(Attribute::Bold),
            Cell::new(cost.total_consumption).set_alignment(CellAlignment::Right),
            Cell::new(pounds(summary.energy)).set_alignment(CellAlignment::Right),
            Cell::new(pounds(summary.standing))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Dim),
            Cell::new(pounds(summary.total))
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Bold),
            Cell::new(format!("{:.1}", summary.days)).set_alignment(CellAlignment::Right),
            Cell::new(summary.per_day.map_or_else(|| "-".to_string(), pounds))
                .set_alignment(CellAlignment::Right),
            Cell::new(
                summary.effective_rate.map_or_else(|| "-".to_string(), |rate| rate.to_string()),
            )
            .set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_battery_table(summary: &LoadShiftSummary) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Charged", "Discharged", "Full intervals", "Final charge"]);
    table.add_row(vec![
        Cell::new(summary.charged).fg(Color::DarkYellow),
        Cell::new(summary.discharged).fg(Color::Cyan),
        Cell::new(summary.n_full),
        Cell::new(summary.final_charge),
    ]);
    table
}

pub fn build_products_table(products: &[Product]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Code", "Name", "Brand", "Variable", "Green", "From", "To"]);
    for product in products {
        table.add_row(vec![
            Cell::new(&product.code).add_attribute(Attribute::Bold),
            Cell::new(&product.display_name),
            Cell::new(&product.brand).add_attribute(Attribute::Dim),
            Cell::new(if product.is_variable { "yes" } else { "no" }),
            Cell::new(if product.is_green { "yes" } else { "no" })
                .fg(if product.is_green { Color::Green } else { Color::Reset }),
            Cell::new(format_date(product.available_from)),
            Cell::new(format_date(product.available_to)).add_attribute(Attribute::Dim),
        ]);
    }
    table
}
