//! Explorer for resolved Polymarket election markets.
//!
//! The core is two pure pieces over a fixed dataset: [`engine`] filters and
//! orders rows for the table, [`stats`] derives per-horizon accuracy and win
//! rates for the summaries. [`ui`] renders both in the terminal.

pub mod app;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod format;
pub mod stats;
pub mod types;
pub mod ui;
