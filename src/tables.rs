use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::core::{export::ExportDocument, prices::DayAheadPrices, zone::Zone};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

pub fn build_prices_table(zone: Zone, prices: &DayAheadPrices) -> Table {
    let mean_rate = prices.mean_rate();
    let mut table = new_table();
    table.set_header(vec!["Zone", "Date", "Start", "End", "Price"]);
    for price in prices.as_slice() {
        table.add_row(vec![
            Cell::new(zone).add_attribute(Attribute::Dim),
            Cell::new(price.start.format("%b %d")).add_attribute(Attribute::Dim),
            Cell::new(price.start.format("%H:%M")),
            Cell::new(price.end.format("%H:%M")).add_attribute(Attribute::Dim),
            Cell::new(price.rate)
                .set_alignment(CellAlignment::Right)
                .fg(if price.rate >= mean_rate { Color::Red } else { Color::Green }),
        ]);
    }
    table
}

pub fn build_summary_table(document: &ExportDocument) -> Table {
    let metadata = &document.metadata;
    let summary = &document.summary;
    let mut table = new_table();
    table.set_header(vec!["Metric", "Value"]);
    let rows = [
        ("Start", metadata.start_time.clone()),
        ("End", metadata.end_time.clone()),
        ("Datapoints", metadata.num_datapoints.to_string()),
        ("Total consumption", summary.total_consumption.to_string()),
        ("Total solar generation", summary.total_solar_generation.to_string()),
        ("Peak grid import", summary.max_grid_power.to_string()),
        ("Average spot price", summary.average_spot_price.to_string()),
        ("Self-consumption", summary.self_consumption_ratio.to_string()),
    ];
    for (metric, value) in rows {
        table.add_row(vec![
            Cell::new(metric).add_attribute(Attribute::Dim),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
