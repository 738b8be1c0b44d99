//! `credit-stress` library crate.
//!
//! The binary (`spread`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes or touching the network
//! - data sources are pluggable behind `data::DataSource`
//! - the pipeline reads top to bottom: data -> align -> spread -> regime -> stats -> report

pub mod align;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod regime;
pub mod report;
pub mod spread;
pub mod stats;
