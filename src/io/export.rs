//! Export result rows to CSV.
//!
//! Columns follow the pipe schema: `date,fips,county,cases,deaths`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::CovidRow;
use crate::error::AppError;

/// Write rows to a CSV file.
pub fn write_rows_csv(path: &Path, rows: &[CovidRow]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_rows(file, rows)
}

/// Write rows as CSV to any writer. The header is written even with no rows.
pub fn write_rows<W: Write>(writer: W, rows: &[CovidRow]) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);

    writer
        .write_record(["date", "fips", "county", "cases", "deaths"])
        .map_err(|e| AppError::input(format!("Failed to write export CSV header: {e}")))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::input(format!("Failed to flush export CSV: {e}")))?;

    Ok(())
}
