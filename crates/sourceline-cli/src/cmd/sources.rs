//! Sources command: registered implementations and their activation

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use sourceline_core::Registry;
use sourceline_workspace::{Workspace, WorkspaceConfiguration};

fn render(registry: &Registry, configuration: &WorkspaceConfiguration) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Source").fg(Color::Cyan),
            Cell::new("Active").fg(Color::Cyan),
        ]);

    for descriptor in registry.descriptors() {
        let active = if configuration.is_active(descriptor.id()) {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no")
        };
        table.add_row(vec![Cell::new(descriptor.id()), active]);
    }
    table
}

pub fn run(root: &Path, registry: &Registry) -> Result<()> {
    let workspace = Workspace::open(root, registry)?;
    eprintln!("\n{}", render(registry, workspace.configuration()));
    Ok(())
}
