use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::{self, CatalogNode, Scanner};
use crate::config::DashboardConfig;
use crate::data::cache::TableCache;
use crate::data::export;
use crate::data::filter::{filter, FilterSpec, NumericRange};
use crate::data::model::Table;
use crate::data::summary::{price_series, PricePoint, PriceSummary};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// What the front-end should show in the main area.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewStatus {
    /// No file picked yet.
    NoSelection,
    /// The selected file could not be loaded.
    LoadFailed(String),
    /// The file loaded but no row passes the filters.
    NoMatchingRows,
    /// Number of rows passing the filters.
    Rows(usize),
}

/// The full session state, independent of rendering.
///
/// The front-end owns one of these and passes it to every interaction; the
/// data functions it calls stay pure.
pub struct DashboardState {
    pub config: DashboardConfig,

    /// Catalog of the data directory (empty until scanned or on failure).
    pub catalog: Vec<CatalogNode>,

    /// File picked in the catalog.
    pub selected_file: Option<PathBuf>,

    /// Loaded table (None until a file loads successfully).
    pub table: Option<Arc<Table>>,

    /// Current predicates.
    pub filters: FilterSpec,

    /// Rows passing `filters` (cached).
    pub filtered: Option<Table>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    cache: TableCache,
}

impl DashboardState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            catalog: Vec::new(),
            selected_file: None,
            table: None,
            filters: FilterSpec::default(),
            filtered: None,
            status_message: None,
            cache: TableCache::new(),
        }
    }

    /// Rescan the data directory. On failure the catalog is emptied, a
    /// warning is kept in `status_message` and `false` is returned; an empty
    /// but readable directory is not a failure.
    pub fn refresh_catalog(&mut self) -> bool {
        let scanner = Scanner::from_config(&self.config);
        match scanner.scan(&self.config.data_dir) {
            Ok(nodes) => {
                log::info!(
                    "catalog of {}: {} files",
                    self.config.data_dir.display(),
                    catalog::file_count(&nodes)
                );
                if nodes.is_empty() {
                    self.status_message = Some(format!(
                        "No data found in {}",
                        self.config.data_dir.display()
                    ));
                }
                self.catalog = nodes;
                true
            }
            Err(e) => {
                log::warn!("catalog scan failed: {e}");
                self.catalog = Vec::new();
                self.status_message = Some(format!("Warning: {e}"));
                false
            }
        }
    }

    /// Select and load a file, resetting the filters to the table defaults.
    pub fn select_file(&mut self, path: &Path) {
        self.selected_file = Some(path.to_path_buf());
        match self.cache.load(path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    table.len(),
                    table.columns
                );
                self.filters = FilterSpec::for_table(&table, &self.config.columns);
                self.table = Some(table);
                self.status_message = None;
                self.refilter();
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.table = None;
                self.filtered = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Recompute `filtered` after a filter change.
    pub fn refilter(&mut self) {
        self.filtered = self.table.as_deref().map(|t| filter(t, &self.filters));
    }

    /// Set or clear (`None`) the substring predicate of a column.
    pub fn set_column_filter(&mut self, column: &str, value: Option<String>) {
        match value {
            Some(v) => {
                self.filters.columns.insert(column.to_string(), v);
            }
            None => {
                self.filters.columns.remove(column);
            }
        }
        self.refilter();
    }

    /// Set the inclusive price range.
    pub fn set_price_range(&mut self, min: f64, max: f64) {
        self.filters.range = Some(NumericRange::new(&self.config.columns.price, min, max));
        self.refilter();
    }

    /// Back to the defaults of the loaded table.
    pub fn clear_filters(&mut self) {
        self.filters = match &self.table {
            Some(t) => FilterSpec::for_table(t, &self.config.columns),
            None => FilterSpec::default(),
        };
        self.refilter();
    }

    pub fn view_status(&self) -> ViewStatus {
        if self.selected_file.is_none() {
            return ViewStatus::NoSelection;
        }
        match &self.filtered {
            None => ViewStatus::LoadFailed(
                self.status_message
                    .clone()
                    .unwrap_or_else(|| "Unable to load the selected file".to_string()),
            ),
            Some(t) if t.is_empty() => ViewStatus::NoMatchingRows,
            Some(t) => ViewStatus::Rows(t.len()),
        }
    }

    pub fn summary(&self) -> Option<PriceSummary> {
        PriceSummary::compute(self.filtered.as_ref()?, &self.config.columns.price)
    }

    pub fn series(&self) -> Option<Vec<PricePoint>> {
        let cols = &self.config.columns;
        price_series(self.filtered.as_ref()?, &cols.date, &cols.price)
    }

    /// CSV of the filtered rows with its suggested file name.
    pub fn export_csv(&self) -> Option<Result<(String, String)>> {
        let table = self.filtered.as_ref()?;
        let name = export::export_file_name(self.selected_file.as_deref()?);
        Some(export::to_csv_string(table).map(|csv| (name, csv)))
    }
}
