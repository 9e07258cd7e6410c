//! Error types for the dashboard core.
//!
//! Scanning and loading return typed failures; the session layer turns them
//! into status messages instead of letting them escape to the front-end.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the catalog scanner, the loaders and the exporter.
#[derive(Debug, Error)]
pub enum Error {
    /// path missing or unreadable
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// file could not be parsed as tabular data
    #[error("invalid data in {path}: {reason}")]
    DataFormat { path: PathBuf, reason: String },

    /// CSV serialization failed
    #[error("export failed: {0}")]
    Export(#[from] csv::Error),

    /// configuration file unreadable or malformed
    #[error("invalid configuration {path}: {reason}")]
    Config { path: PathBuf, reason: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a loader failure, keeping the whole `anyhow` context chain.
    pub(crate) fn data_format(path: impl Into<PathBuf>, err: &anyhow::Error) -> Self {
        Error::DataFormat {
            path: path.into(),
            reason: format!("{err:#}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
