//! CSV ingest for daily series.
//!
//! Each series lives in its own file `<dir>/<series_id>.csv` with a header row
//! and two meaningful columns:
//!
//! ```text
//! date,value
//! 2024-01-02,3.95
//! 2024-01-03,.
//! ```
//!
//! - dates are `YYYY-MM-DD` (or `MM/DD/YYYY`, as spreadsheets like to emit)
//! - empty cells and FRED's `.` marker are missing observations and skipped
//! - the value column may be named `value`, `close`, `adj_close` or the series id;
//!   a two-column file falls back to its second column

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::data::{DataSource, DataUnavailable, DateWindow, parse_value};
use crate::domain::SeriesMap;

const VALUE_COLUMNS: [&str; 3] = ["value", "close", "adj_close"];

/// Reads `<dir>/<series_id>.csv` files.
#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, series_id: &str) -> PathBuf {
        self.dir.join(format!("{series_id}.csv"))
    }
}

impl DataSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch_series(&self, series_id: &str, window: &DateWindow) -> Result<SeriesMap, DataUnavailable> {
        let path = self.path_for(series_id);
        debug!(path = %path.display(), "reading series file");
        let file = File::open(&path)
            .map_err(|e| DataUnavailable::new(series_id, format!("failed to open '{}': {e}", path.display())))?;
        read_series_csv(file, series_id, window)
    }
}

/// Parse a `date,value` CSV into a series restricted to `window`.
pub fn read_series_csv<R: Read>(reader: R, series_id: &str, window: &DateWindow) -> Result<SeriesMap, DataUnavailable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| DataUnavailable::new(series_id, format!("failed to read CSV headers: {e}")))?
        .clone();
    let (date_idx, value_idx) = resolve_columns(&headers, series_id)?;

    let mut series = SeriesMap::new();
    let mut skipped = 0usize;
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header; CSV lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| DataUnavailable::new(series_id, format!("line {line}: {e}")))?;

        let raw_date = record.get(date_idx).unwrap_or("");
        if raw_date.is_empty() {
            skipped += 1;
            continue;
        }
        let date = parse_date(raw_date)
            .ok_or_else(|| DataUnavailable::new(series_id, format!("line {line}: invalid date '{raw_date}'")))?;
        if !window.contains(date) {
            continue;
        }
        let Some(value) = record.get(value_idx).and_then(parse_value) else {
            skipped += 1;
            continue;
        };
        if series.insert(date, value).is_some() {
            return Err(DataUnavailable::new(series_id, format!("line {line}: duplicate date {date}")));
        }
    }

    if skipped > 0 {
        warn!(series = series_id, skipped, "skipped rows without a usable value");
    }
    Ok(series)
}

fn resolve_columns(headers: &StringRecord, series_id: &str) -> Result<(usize, usize), DataUnavailable> {
    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect();

    let date_idx = *header_map
        .get("date")
        .ok_or_else(|| DataUnavailable::new(series_id, "missing 'date' column"))?;

    let wanted = normalize_header_name(series_id);
    let by_name = VALUE_COLUMNS
        .iter()
        .copied()
        .chain(std::iter::once(wanted.as_str()))
        .find_map(|name| header_map.get(name).copied());
    let value_idx = match by_name {
        Some(idx) => idx,
        None if headers.len() == 2 => 1 - date_idx,
        None => {
            return Err(DataUnavailable::new(
                series_id,
                "missing value column (expected 'value', 'close', 'adj_close' or the series id)",
            ));
        }
    };
    Ok((date_idx, value_idx))
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. Strip it so "date" still matches.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase().replace([' ', '-'], "_")
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn all() -> DateWindow {
        DateWindow::new(day(2000, 1, 1), None).unwrap()
    }

    #[test]
    fn reads_date_value_with_missing_markers() {
        let csv = "date,value\n2024-01-02,3.95\n2024-01-03,.\n2024-01-04,\n2024-01-05,4.01\n";
        let s = read_series_csv(csv.as_bytes(), "DGS10", &all()).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s[&day(2024, 1, 2)], 3.95);
        assert_eq!(s[&day(2024, 1, 5)], 4.01);
    }

    #[test]
    fn strips_bom_and_accepts_close_column() {
        let csv = "\u{feff}Date,Open,Close\n01/02/2024,99.0,100.5\n";
        let s = read_series_csv(csv.as_bytes(), "LQD", &all()).unwrap();
        assert_eq!(s[&day(2024, 1, 2)], 100.5);
    }

    #[test]
    fn two_column_file_uses_second_column() {
        let csv = "DATE,VIXCLS\n2024-01-02,13.2\n";
        let s = read_series_csv(csv.as_bytes(), "vix", &all()).unwrap();
        assert_eq!(s[&day(2024, 1, 2)], 13.2);
    }

    #[test]
    fn window_filters_rows() {
        let csv = "date,value\n2024-01-02,1\n2024-01-03,2\n2024-01-04,3\n";
        let window = DateWindow::new(day(2024, 1, 3), Some(day(2024, 1, 3))).unwrap();
        let s = read_series_csv(csv.as_bytes(), "x", &window).unwrap();
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn bad_date_and_duplicates_are_errors() {
        let bad = "date,value\n2024-13-45,1\n";
        let err = read_series_csv(bad.as_bytes(), "x", &all()).unwrap_err();
        assert!(err.reason.contains("invalid date"));

        let dup = "date,value\n2024-01-02,1\n2024-01-02,2\n";
        let err = read_series_csv(dup.as_bytes(), "x", &all()).unwrap_err();
        assert!(err.reason.contains("duplicate"));
    }

    #[test]
    fn missing_columns_are_reported() {
        let csv = "when,a,b\n2024-01-02,1,2\n";
        assert!(read_series_csv(csv.as_bytes(), "x", &all()).is_err());
        let csv = "date,a,b\n2024-01-02,1,2\n";
        let err = read_series_csv(csv.as_bytes(), "x", &all()).unwrap_err();
        assert!(err.reason.contains("value column"));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let src = CsvSource::new("/nonexistent-dir-for-tests");
        let err = src.fetch_series("vix", &all()).unwrap_err();
        assert_eq!(err.series, "vix");
    }
}
