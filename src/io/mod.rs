//! Input/output helpers.
//!
//! - CSV series ingest as a `DataSource` (`ingest`)
//! - result exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;

pub use export::{write_spreads_csv, write_summary_json};
pub use ingest::{CsvSource, read_series_csv};
