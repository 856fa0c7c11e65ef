//! Terminal explorer over the node-voltage and branch-current mappings, using Ratatui.

pub mod app;
pub mod events;
pub mod handler;
pub mod ui;

pub use handler::run_explorer;
