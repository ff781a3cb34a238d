//! Subcommand implementations

pub mod integrate;
pub mod sources;
pub mod status;
pub mod update;

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use sourceline_core::Registry;
use sourceline_workspace::SourceReport;

/// Every data source implementation shipped with this binary.
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    sourceline_local::register(&mut registry);
    registry
}

fn flag(ok: bool) -> Cell {
    if ok {
        Cell::new("ok").fg(Color::Green)
    } else {
        Cell::new("failed").fg(Color::Red)
    }
}

/// One row per source with the terminal label of each stage.
pub fn render_reports(reports: &[SourceReport]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Source").fg(Color::Cyan),
            Cell::new("Update").fg(Color::Cyan),
            Cell::new("Parse").fg(Color::Cyan),
            Cell::new("RDF").fg(Color::Cyan),
            Cell::new("Graph").fg(Color::Cyan),
        ]);

    for report in reports {
        let update_color = if report.update.is_success() {
            Color::Green
        } else {
            Color::Yellow
        };
        table.add_row(vec![
            Cell::new(&report.id),
            Cell::new(report.update.to_string()).fg(update_color),
            Cell::new(report.parse.to_string()),
            flag(report.export_rdf),
            report.export_graph.map_or_else(|| Cell::new("-"), flag),
        ]);
    }
    table
}
