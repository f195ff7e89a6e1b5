//! d33 estimation from piezoelectric displacement-vs-voltage butterfly loops.
//!
//! A sweep is loaded from a spreadsheet (or CSV / JSON / Parquet), split into
//! the n1, p1, p2 and n2 branches, and each branch gets a least-squares slope.

pub mod analysis;
pub mod app;
pub mod cli;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
