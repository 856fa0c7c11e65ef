//! Kirchhoff circuit analysis runner.
//!
//! The solver is an external module; this crate acquires it, hands it a
//! circuit, and presents what comes back.

pub mod analysis;
pub mod circuit;
pub mod cli;
pub mod config;
pub mod module;
pub mod printer;
pub mod report;
pub mod session;
pub mod tui;
