//! pricedash - price-tracking dashboard core.
//!
//! Browse a folder tree of spreadsheet files ([`catalog`]), load one into a
//! [`data::model::Table`], filter it ([`data::filter`]), and derive the
//! statistics, price series and CSV export the front-end displays. Session
//! state lives in [`state::DashboardState`].

pub mod catalog;
pub mod config;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;

pub use catalog::{scan, CatalogNode, Scanner};
pub use config::{ColumnRoles, DashboardConfig};
pub use data::filter::{filter, FilterSpec};
pub use data::loader::load_file;
pub use data::model::{CellValue, Table};
pub use error::{Error, Result};
pub use state::{DashboardState, ViewStatus};
