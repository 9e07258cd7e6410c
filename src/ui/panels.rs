use std::fmt::Write as _;

use crate::catalog;
use crate::data::filter::choices;
use crate::data::summary::{PricePoint, PriceSummary};
use crate::state::{DashboardState, ViewStatus};

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Catalog outline, or a warning when nothing was found.
pub fn navigation(state: &DashboardState) -> String {
    if state.catalog.is_empty() {
        return state
            .status_message
            .clone()
            .unwrap_or_else(|| "No data found".to_string());
    }
    catalog::outline(&state.catalog)
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Available values of each categorical column present in the table.
pub fn filter_choices(state: &DashboardState) -> String {
    let mut out = String::new();
    let Some(table) = state.table.as_deref() else {
        return out;
    };
    for col in state.config.columns.categorical() {
        if !table.has_column(col) {
            continue;
        }
        let values: Vec<String> = choices(table, col).iter().map(|v| v.to_string()).collect();
        let _ = writeln!(out, "{col}: {}", values.join(", "));
    }
    out
}

// ---------------------------------------------------------------------------
// Statistics and series
// ---------------------------------------------------------------------------

pub fn statistics(summary: &PriceSummary) -> String {
    format!(
        "Entries: {}\nMean price: {:.2} €\nMin price: {:.2} €\nMax price: {:.2} €\n",
        summary.count, summary.mean, summary.min, summary.max
    )
}

/// Price evolution as `date  price` lines.
pub fn series(points: &[PricePoint]) -> String {
    let mut out = String::new();
    for p in points {
        let _ = writeln!(out, "{}  {:.2}", p.date.format("%Y-%m-%d"), p.price);
    }
    out
}

/// One-line status for the main area.
pub fn status_line(status: &ViewStatus) -> String {
    match status {
        ViewStatus::NoSelection => "Select a data file to start".to_string(),
        ViewStatus::LoadFailed(msg) => msg.clone(),
        ViewStatus::NoMatchingRows => "No rows match the selected filters".to_string(),
        ViewStatus::Rows(n) => format!("{n} entries match"),
    }
}
