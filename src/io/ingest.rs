//! CSV ingest.
//!
//! Turns a header + numeric-columns CSV into aligned `f64` series, one per
//! requested column.
//!
//! - **Strict schema**: every requested column must exist (exit code 2)
//! - **Row-level validation**: a row with a missing or unparsable cell in any
//!   requested column is skipped as a whole and reported, so series stay aligned
//! - Header lookup is case-insensitive and accepts a few common aliases
//!   (`time` for `t`, `temperature` for `T`, ...)

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use log::{debug, warn};

use crate::domain::{ArrheniusConfig, FitConfig};
use crate::error::AppError;

/// Header spellings treated as the same column.
const ALIAS_GROUPS: &[&[&str]] = &[
    &["t", "time"],
    &["temperature", "temp", "t_k"],
    &["k", "rate_constant"],
    &["a", "ca", "xa"],
    &["b", "cb", "xb"],
    &["d", "cd", "xd"],
    &["r", "cr"],
    &["s", "cs"],
];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Aligned numeric columns read from one CSV.
#[derive(Debug, Clone)]
pub struct IngestedSeries {
    /// `(requested name, values)` in request order.
    pub columns: Vec<(String, Vec<f64>)>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl IngestedSeries {
    /// Values of a requested column (case-insensitive).
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        let wanted = normalize_header_name(name);
        self.columns
            .iter()
            .find(|(n, _)| normalize_header_name(n) == wanted)
            .map(|(_, v)| v.as_slice())
    }

    /// Like [`Self::column`], but a missing column is an error.
    pub fn require(&self, name: &str) -> Result<&[f64], AppError> {
        self.column(name)
            .ok_or_else(|| AppError::new(2, format!("Column `{name}` was not loaded.")))
    }
}

/// Load the time column plus every species column `config.model` reads.
pub fn load_fit_series(config: &FitConfig) -> Result<IngestedSeries, AppError> {
    let mut names = vec![config.columns.time.as_str()];
    names.extend(
        config
            .model
            .species()
            .iter()
            .map(|s| config.columns.for_species(*s)),
    );
    load_columns(&config.csv_path, &names)
}

/// Load the rate-constant and temperature columns for an Arrhenius fit.
pub fn load_arrhenius_series(config: &ArrheniusConfig) -> Result<IngestedSeries, AppError> {
    load_columns(
        &config.csv_path,
        &[config.k_column.as_str(), config.temperature_column.as_str()],
    )
}

/// Read the named columns from `path`.
pub fn load_columns(path: &Path, names: &[&str]) -> Result<IngestedSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let indices = names
        .iter()
        .map(|name| {
            resolve_column(name, &header_map)
                .ok_or_else(|| AppError::new(2, format!("Missing required column: `{name}`")))
        })
        .collect::<Result<Vec<usize>, AppError>>()?;
    debug!("ingest: columns {names:?} at indices {indices:?}");

    let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, names, &indices) {
            Ok(row) => {
                for (column, v) in values.iter_mut().zip(row) {
                    column.push(v);
                }
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = values.first().map_or(0, Vec::len);
    if rows_used == 0 {
        return Err(AppError::new(3, "No valid rows remain after parsing the CSV."));
    }
    if !row_errors.is_empty() {
        warn!("ingest: skipped {} of {rows_read} rows", row_errors.len());
    }

    Ok(IngestedSeries {
        columns: names.iter().map(|n| n.to_string()).zip(values).collect(),
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// Exact (case-insensitive) header first, then the name's alias group.
fn resolve_column(name: &str, header_map: &HashMap<String, usize>) -> Option<usize> {
    let wanted = normalize_header_name(name);
    if let Some(idx) = header_map.get(&wanted) {
        return Some(*idx);
    }
    ALIAS_GROUPS
        .iter()
        .filter(|group| group.contains(&wanted.as_str()))
        .flat_map(|group| group.iter())
        .find_map(|alias| header_map.get(*alias).copied())
}

fn parse_row(record: &StringRecord, names: &[&str], indices: &[usize]) -> Result<Vec<f64>, String> {
    names
        .iter()
        .zip(indices)
        .map(|(name, idx)| {
            let raw = record
                .get(*idx)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| format!("Missing value: `{name}`"))?;
            parse_f64(raw).ok_or_else(|| format!("Invalid number '{raw}' in `{name}`"))
        })
        .collect()
}

fn parse_f64(s: &str) -> Option<f64> {
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_requested_columns_in_order() {
        let file = csv_file("t,a,b\n0,2.0,3.0\n1,1.5,2.5\n2,1.0,2.0\n");
        let data = load_columns(file.path(), &["a", "t"]).unwrap();
        assert_eq!(data.rows_read, 3);
        assert_eq!(data.rows_used, 3);
        assert_eq!(data.columns[0].0, "a");
        assert_eq!(data.column("t").unwrap(), &[0.0, 1.0, 2.0]);
        assert_eq!(data.column("A").unwrap(), &[2.0, 1.5, 1.0]);
        assert!(data.column("b").is_none());
    }

    #[test]
    fn bad_rows_are_skipped_and_reported() {
        let file = csv_file("t,a\n0,2.0\n1,oops\n2,\n3,0.5\n");
        let data = load_columns(file.path(), &["t", "a"]).unwrap();
        assert_eq!(data.rows_read, 4);
        assert_eq!(data.rows_used, 2);
        assert_eq!(data.column("t").unwrap(), &[0.0, 3.0]);
        let lines: Vec<usize> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4]);
    }

    #[test]
    fn headers_are_case_insensitive_with_aliases() {
        let file = csv_file("\u{feff}Time,CA\n0,1\n1,0.5\n");
        let data = load_columns(file.path(), &["t", "a"]).unwrap();
        assert_eq!(data.column("t").unwrap(), &[0.0, 1.0]);
        assert_eq!(data.column("a").unwrap(), &[1.0, 0.5]);

        let file = csv_file("k,Temperature\n0.1,300\n0.2,310\n");
        let data = load_columns(file.path(), &["k", "temp"]).unwrap();
        assert_eq!(data.column("temp").unwrap(), &[300.0, 310.0]);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let file = csv_file("t,a\n0,1\n");
        let err = load_columns(file.path(), &["t", "b"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("`b`"));
    }

    #[test]
    fn no_usable_rows_is_insufficient_data() {
        let file = csv_file("t,a\nx,y\n");
        let err = load_columns(file.path(), &["t", "a"]).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
