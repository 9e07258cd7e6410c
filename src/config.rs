//! Dashboard configuration.
//!
//! Everything has a default so the dashboard runs without a config file; a
//! JSON file may override any subset of fields:
//!
//! ```json
//! {
//!   "data_dir": "data",
//!   "extensions": ["xlsx", "csv"],
//!   "max_depth": 8,
//!   "columns": { "price": "price_eur" }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Names of the columns that drive the optional dashboard features.
///
/// A role whose column is absent from a loaded table simply disables the
/// matching filter or view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnRoles {
    pub brand: String,
    pub kind: String,
    pub size: String,
    pub origin: String,
    pub price: String,
    pub date: String,
}

impl Default for ColumnRoles {
    fn default() -> Self {
        Self {
            brand: "marque".into(),
            kind: "type".into(),
            size: "gramage".into(),
            origin: "origine".into(),
            price: "prix".into(),
            date: "date".into(),
        }
    }
}

impl ColumnRoles {
    /// The categorical columns offered as selectors, in display order.
    pub fn categorical(&self) -> [&str; 4] {
        [
            self.brand.as_str(),
            self.kind.as_str(),
            self.size.as_str(),
            self.origin.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Root of the spreadsheet catalog.
    pub data_dir: PathBuf,
    /// Recognized file extensions, lowercase, without the dot.
    pub extensions: Vec<String>,
    /// Deepest directory level the scanner descends into.
    pub max_depth: usize,
    pub columns: ColumnRoles,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            extensions: default_extensions(),
            max_depth: 32,
            columns: ColumnRoles::default(),
        }
    }
}

pub fn default_extensions() -> Vec<String> {
    ["xlsx", "xlsm", "xls", "ods", "csv", "parquet"]
        .iter()
        .map(|e| e.to_string())
        .collect()
}

impl DashboardConfig {
    /// Create a configuration rooted at the given data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Read a JSON configuration file; missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut config: DashboardConfig =
            serde_json::from_str(&text).map_err(|e| Error::Config {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        config.extensions = config
            .extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        Ok(config)
    }

    pub fn data_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.data_dir = value.into();
        self
    }

    pub fn max_depth(mut self, value: usize) -> Self {
        self.max_depth = value;
        self
    }

    pub fn columns(mut self, value: ColumnRoles) -> Self {
        self.columns = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(config.extensions.contains(&"xlsx".to_string()));
        assert_eq!(config.columns.price, "prix");
        assert_eq!(
            config.columns.categorical(),
            ["marque", "type", "gramage", "origine"]
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dash.json");
        std::fs::write(
            &path,
            r#"{ "extensions": [".XLSX"], "columns": { "price": "price_eur" } }"#,
        )
        .unwrap();

        let config = DashboardConfig::from_json_file(&path).unwrap();
        assert_eq!(config.extensions, vec!["xlsx".to_string()]);
        assert_eq!(config.columns.price, "price_eur");
        assert_eq!(config.columns.brand, "marque");
        assert_eq!(config.max_depth, 32);
    }

    #[test]
    fn test_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dash.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = DashboardConfig::from_json_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_builder() {
        let config = DashboardConfig::new("/srv/prices").max_depth(3);
        assert_eq!(config.data_dir, PathBuf::from("/srv/prices"));
        assert_eq!(config.max_depth, 3);
    }
}
