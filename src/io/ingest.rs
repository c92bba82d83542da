//! Schema-on-read ingest of the extracted case/death CSV.
//!
//! The CSV is read as text and then coerced column by column through a
//! declarative type table (`CASE_COLUMNS`):
//! - empty cells are nulls and survive ingest (they are dropped later)
//! - a cell that is present but cannot be coerced is a fatal parse error
//!   naming the column, line and raw value (exit code 3)
//! - a missing required column is fatal (exit code 3)

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::debug;

use crate::domain::CaseRow;
use crate::error::AppError;

/// Canonical type a column is coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Date,
    Integer,
    Text,
}

impl ColumnType {
    fn label(self) -> &'static str {
        match self {
            ColumnType::Date => "date",
            ColumnType::Integer => "non-negative integer",
            ColumnType::Text => "text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub ty: ColumnType,
}

/// Columns read from `epicurve_rpt_date.csv`. Other columns are ignored.
pub const CASE_COLUMNS: [ColumnSpec; 4] = [
    ColumnSpec { name: "report_date", ty: ColumnType::Date },
    ColumnSpec { name: "county", ty: ColumnType::Text },
    ColumnSpec { name: "cases_cum", ty: ColumnType::Integer },
    ColumnSpec { name: "death_cum", ty: ColumnType::Integer },
];

/// A coerced, non-null cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Date(NaiveDate),
    Integer(u64),
    Text(String),
}

/// Ingest output: parsed rows plus the number of data records read.
#[derive(Debug, Clone, Default)]
pub struct CaseTable {
    pub rows: Vec<CaseRow>,
    pub rows_read: usize,
}

/// Load the extracted case/death CSV from disk.
pub fn load_case_rows(path: &Path) -> Result<CaseTable, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::format(format!("Failed to open extracted CSV '{}': {e}", path.display()))
    })?;
    let table = read_case_rows(file)?;
    debug!(path = %path.display(), rows = table.rows_read, "loaded case rows");
    Ok(table)
}

/// Parse case/death rows from any reader.
pub fn read_case_rows<R: Read>(reader: R) -> Result<CaseTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::format(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let mut indices = [0usize; CASE_COLUMNS.len()];
    for (slot, spec) in indices.iter_mut().zip(CASE_COLUMNS.iter()) {
        *slot = *header_map
            .get(spec.name)
            .ok_or_else(|| AppError::format(format!("Missing required column: `{}`", spec.name)))?;
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::format(format!("CSV parse error on line {line}: {e}")))?;

        let mut row = CaseRow::default();
        for (spec, &col) in CASE_COLUMNS.iter().zip(indices.iter()) {
            let raw = cell(&record, col);
            let value = coerce(raw, spec.ty).map_err(|reason| {
                AppError::format(format!(
                    "Column `{}` line {line}: cannot coerce '{}' to {}: {reason}",
                    spec.name,
                    raw.unwrap_or(""),
                    spec.ty.label()
                ))
            })?;
            assign(&mut row, spec.name, value)
                .map_err(|reason| AppError::format(format!("Column `{}` line {line}: {reason}", spec.name)))?;
        }
        rows.push(row);
    }

    let rows_read = rows.len();
    Ok(CaseTable { rows, rows_read })
}

/// Coerce one raw cell. `Ok(None)` means null.
pub fn coerce(raw: Option<&str>, ty: ColumnType) -> Result<Option<Value>, String> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value = match ty {
        ColumnType::Date => Value::Date(parse_date(raw)?),
        ColumnType::Integer => Value::Integer(parse_count(raw)?),
        ColumnType::Text => Value::Text(raw.to_string()),
    };
    Ok(Some(value))
}

/// Store a coerced value in its field. A column/type pair outside
/// `CASE_COLUMNS` is an error, never a silent drop.
fn assign(row: &mut CaseRow, column: &str, value: Option<Value>) -> Result<(), String> {
    match (column, value) {
        ("report_date", Some(Value::Date(d))) => row.report_date = Some(d),
        ("county", Some(Value::Text(s))) => row.county = Some(s),
        ("cases_cum", Some(Value::Integer(n))) => row.cases_cum = Some(n),
        ("death_cum", Some(Value::Integer(n))) => row.death_cum = Some(n),
        ("report_date" | "county" | "cases_cum" | "death_cum", None) => {}
        (column, Some(value)) => return Err(format!("no field accepts {value:?} for column `{column}`")),
        (column, None) => return Err(format!("unknown column `{column}`")),
    }
    Ok(())
}

pub(crate) fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Strip a UTF-8 BOM on the first header, otherwise the column looks missing.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

pub(crate) fn cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const DATE_FMTS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
    const DATETIME_FMTS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err("expected YYYY-MM-DD, MM/DD/YYYY, YYYY/MM/DD or an ISO datetime".to_string())
}

fn parse_count(s: &str) -> Result<u64, String> {
    if let Ok(n) = s.parse::<u64>() {
        return Ok(n);
    }
    // Exports sometimes write counts as floats (`500.0`).
    let v = s.parse::<f64>().map_err(|_| "not a number".to_string())?;
    if !v.is_finite() || v < 0.0 || v.fract() != 0.0 || v > u64::MAX as f64 {
        return Err("not a non-negative whole number".to_string());
    }
    Ok(v as u64)
}
