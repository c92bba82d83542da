//! Static county reference table (FIPS code, county name, state).
//!
//! The Georgia table ships with the crate and is embedded at compile time; a
//! path override may replace it. The table is loaded once per fetch and never
//! mutated.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::domain::CountyRef;
use crate::error::AppError;
use crate::io::ingest::{build_header_map, cell};

const EMBEDDED_COUNTIES: &str = include_str!("../../data/counties.csv");

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountyTable {
    rows: Vec<CountyRef>,
}

impl CountyTable {
    /// Load from `path`, or the embedded Georgia table when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let table = match path {
            Some(path) => {
                let file = File::open(path).map_err(|e| {
                    AppError::input(format!(
                        "Failed to open county reference table '{}': {e}",
                        path.display()
                    ))
                })?;
                Self::from_reader(file)?
            }
            None => Self::embedded()?,
        };
        debug!(counties = table.len(), "loaded county reference table");
        Ok(table)
    }

    pub fn embedded() -> Result<Self, AppError> {
        Self::from_reader(EMBEDDED_COUNTIES.as_bytes())
    }

    /// Parse a `fips,county[,state]` CSV. FIPS codes stay strings.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| AppError::input(format!("Failed to read county table headers: {e}")))?
            .clone();
        let header_map = build_header_map(&headers);

        let fips_idx = *header_map
            .get("fips")
            .ok_or_else(|| AppError::input("County table is missing required column: `fips`"))?;
        let county_idx = *header_map
            .get("county")
            .ok_or_else(|| AppError::input("County table is missing required column: `county`"))?;
        let state_idx = header_map.get("state").copied();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let line = idx + 2;
            let record = result
                .map_err(|e| AppError::input(format!("County table parse error on line {line}: {e}")))?;

            let (Some(fips), Some(county)) = (cell(&record, fips_idx), cell(&record, county_idx)) else {
                return Err(AppError::input(format!(
                    "County table line {line}: `fips` and `county` are required."
                )));
            };
            let state = state_idx
                .and_then(|i| cell(&record, i))
                .unwrap_or_default()
                .to_string();

            rows.push(CountyRef {
                fips: fips.to_string(),
                county: county.to_string(),
                state,
            });
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[CountyRef] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// County name -> reference rows, restricted to the given FIPS codes.
    ///
    /// A name can map to several rows when the table repeats it; each one
    /// joins independently.
    pub fn index_by_name<'a>(&'a self, fips: &[String]) -> HashMap<&'a str, Vec<&'a CountyRef>> {
        let mut index: HashMap<&str, Vec<&CountyRef>> = HashMap::new();
        for row in self.rows.iter().filter(|r| fips.contains(&r.fips)) {
            index.entry(row.county.as_str()).or_default().push(row);
        }
        index
    }
}
