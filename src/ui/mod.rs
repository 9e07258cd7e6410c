//! Terminal rendering of the dashboard state.

pub mod grid;
pub mod panels;
