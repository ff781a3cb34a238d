//! Staleness report: persisted version vs. latest upstream version

use chrono::{DateTime, Utc};
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use sourceline_core::{DataSource, SourceMetadata};

use crate::active::ActiveSource;

/// Display value for an unknown version or a failed upstream lookup.
pub const MISSING: &str = "-";

/// One row of the status table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub id: String,
    pub up_to_date: bool,
    pub version: Option<String>,
    /// `None` when the upstream lookup failed.
    pub latest_version: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub files: Vec<String>,
}

impl StatusRow {
    /// Build a row, querying upstream once.
    pub fn build(id: &str, source: &dyn DataSource, metadata: &SourceMetadata) -> Self {
        let latest_version = latest_upstream_version(source);
        Self {
            id: id.to_string(),
            up_to_date: versions_match(metadata, latest_version.as_deref()),
            version: metadata.version.clone(),
            latest_version,
            updated_at: metadata.updated_at,
            files: metadata.source_file_names.clone(),
        }
    }
}

/// Ask the updater for the newest upstream version; failures are logged, not raised.
pub fn latest_upstream_version(source: &dyn DataSource) -> Option<String> {
    match source.updater().newest_version() {
        Ok(version) => Some(version),
        Err(e) if e.is_upstream() => {
            log::warn!("new version of '{}' is not accessible: {e}", source.id());
            None
        }
        Err(e) => {
            log::error!("failed to look up new version of '{}': {e}", source.id());
            None
        }
    }
}

/// A failed lookup (`None`) is never up to date.
pub fn versions_match(metadata: &SourceMetadata, latest: Option<&str>) -> bool {
    latest.is_some_and(|latest| metadata.matches_version(latest))
}

pub fn is_up_to_date(active: &ActiveSource) -> bool {
    versions_match(
        &active.metadata,
        latest_upstream_version(active.source.as_ref()).as_deref(),
    )
}

/// Staleness of every active source, in input order.
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    pub rows: Vec<StatusRow>,
}

impl StatusReport {
    pub fn collect(sources: &[ActiveSource]) -> Self {
        let rows = sources
            .iter()
            .map(|a| StatusRow::build(a.id(), a.source.as_ref(), &a.metadata))
            .collect();
        Self { rows }
    }

    pub fn count_up_to_date(&self) -> usize {
        self.rows.iter().filter(|r| r.up_to_date).count()
    }

    pub fn all_up_to_date(&self) -> bool {
        self.count_up_to_date() == self.rows.len()
    }

    /// "all source data are up-to-date" or "k/n source data are up-to-date".
    pub fn summary_message(&self) -> String {
        summary_message(self.count_up_to_date(), self.rows.len())
    }

    pub fn render(&self) -> String {
        render_summary(&self.rows)
    }
}

pub fn summary_message(up_to_date: usize, total: usize) -> String {
    if up_to_date == total {
        "all source data are up-to-date".to_string()
    } else {
        format!("{up_to_date}/{total} source data are up-to-date")
    }
}

/// Render rows as a table. Pure projection; order follows the input.
pub fn render_summary(rows: &[StatusRow]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Source").fg(Color::Cyan),
            Cell::new("Up to date").fg(Color::Cyan),
            Cell::new("Version").fg(Color::Cyan),
            Cell::new("Latest").fg(Color::Cyan),
            Cell::new("Updated").fg(Color::Cyan),
            Cell::new("Files").fg(Color::Cyan),
        ]);

    for row in rows {
        let flag = if row.up_to_date {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::Red)
        };
        let updated = row
            .updated_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| MISSING.to_string());
        table.add_row(vec![
            Cell::new(&row.id),
            flag,
            Cell::new(row.version.as_deref().unwrap_or(MISSING)),
            Cell::new(row.latest_version.as_deref().unwrap_or(MISSING)),
            Cell::new(updated),
            Cell::new(row.files.join(", ")),
        ]);
    }

    table.to_string()
}
