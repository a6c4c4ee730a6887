//! Result exports.
//!
//! - result JSON (`ResultFile`), the portable representation of one fit
//! - linearized CSV (`x,y,y_fit,residual`), easy to plot in a spreadsheet
//! - sample CSV written by `kfit simulate`, readable by `kfit fit`

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::data::SampleData;
use crate::domain::ResultFile;
use crate::error::AppError;
use crate::report::PointRow;

/// Write a result JSON file.
pub fn write_result_json(path: &Path, result: &ResultFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create result JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), result)
        .map_err(|e| AppError::new(2, format!("Failed to write result JSON: {e}")))?;

    Ok(())
}

/// Write linearized points with fitted values and residuals.
pub fn write_linearized_csv(path: &Path, rows: &[PointRow]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create linearized CSV '{}': {e}", path.display())))?;
    let mut file = BufWriter::new(file);

    writeln!(file, "x,y,y_fit,residual")
        .map_err(|e| AppError::new(2, format!("Failed to write linearized CSV header: {e}")))?;
    for r in rows {
        writeln!(file, "{},{},{},{}", r.x, r.y, r.y_fit, r.residual)
            .map_err(|e| AppError::new(2, format!("Failed to write linearized CSV row: {e}")))?;
    }
    file.flush()
        .map_err(|e| AppError::new(2, format!("Failed to write linearized CSV: {e}")))?;

    Ok(())
}

/// Write a generated sample as CSV (header row, one column per series).
pub fn write_sample_csv<W: Write>(out: W, sample: &SampleData) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);

    let headers: Vec<&str> = sample.columns.iter().map(|(name, _)| name.as_str()).collect();
    writer
        .write_record(&headers)
        .map_err(|e| AppError::new(2, format!("Failed to write sample CSV header: {e}")))?;

    let rows = sample.columns.first().map_or(0, |(_, v)| v.len());
    for i in 0..rows {
        let record: Vec<String> = sample.columns.iter().map(|(_, v)| v[i].to_string()).collect();
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(2, format!("Failed to write sample CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write sample CSV: {e}")))?;

    Ok(())
}

/// [`write_sample_csv`] into a new file.
pub fn write_sample_file(path: &Path, sample: &SampleData) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create sample CSV '{}': {e}", path.display())))?;
    write_sample_csv(BufWriter::new(file), sample)
}
