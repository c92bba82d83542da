//! Shared domain types.
//!
//! These types are serializable so they can be persisted in the pipe file and
//! exported to CSV without intermediate representations.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::settings::PARAMETERS_KEY;

/// One row of the static county reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountyRef {
    pub fips: String,
    pub county: String,
    #[serde(default)]
    pub state: String,
}

/// One parsed row of the extracted case/death CSV.
///
/// Every field is nullable; nulls are dropped during the transform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseRow {
    pub county: Option<String>,
    pub report_date: Option<NaiveDate>,
    pub cases_cum: Option<u64>,
    pub death_cum: Option<u64>,
}

/// Normalized output row handed to the pipe.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CovidRow {
    pub date: NaiveDate,
    pub fips: String,
    pub county: String,
    pub cases: u64,
    pub deaths: u64,
}

/// Which output field plays which role in the pipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoles {
    pub datetime: String,
    pub id: String,
    pub value: String,
}

impl Default for ColumnRoles {
    fn default() -> Self {
        Self {
            datetime: "date".to_string(),
            id: "fips".to_string(),
            value: "cases".to_string(),
        }
    }
}

/// Source-specific block of the pipe parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceParameters {
    pub fips: Vec<String>,
}

/// Parameters produced by registration and persisted by the host.
///
/// Serializes as `{"columns": {...}, "GA-covid": {"fips": [...]}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeParameters {
    pub columns: ColumnRoles,
    #[serde(rename = "GA-covid")]
    pub source: SourceParameters,
}

impl PipeParameters {
    pub fn new(fips: Vec<String>) -> Self {
        Self {
            columns: ColumnRoles::default(),
            source: SourceParameters { fips },
        }
    }

    pub fn fips(&self) -> &[String] {
        &self.source.fips
    }

    pub fn namespace() -> &'static str {
        PARAMETERS_KEY
    }
}

/// Inclusive calendar-date window applied to report dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateBounds {
    pub begin: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateBounds {
    /// Build from datetimes, truncating each to its calendar date.
    pub fn from_datetimes(begin: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self {
            begin: begin.map(|dt| dt.date()),
            end: end.map(|dt| dt.date()),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(begin) = self.begin {
            if date < begin {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }
}
