//! Join, filter and coerce parsed case rows into output rows.
//!
//! Equivalent to:
//!
//! ```text
//! SELECT d.report_date AS date, c.fips, c.county, d.cases_cum AS cases, d.death_cum AS deaths
//! FROM cases d INNER JOIN counties c ON c.county = d.county
//! WHERE c.fips IN (<configured>)
//!   AND d.report_date, d.cases_cum, d.death_cum IS NOT NULL
//!   AND <date window>
//! ```
//!
//! Output is sorted by `(date, fips, county, ..)` so identical inputs always
//! give identical tables.

use tracing::debug;

use crate::data::CountyTable;
use crate::domain::{CaseRow, CovidRow, DateBounds};

/// Row accounting for one transform run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    pub rows_read: usize,
    /// No configured reference row shares the county name.
    pub unmatched: usize,
    /// Null report date, case count or death count.
    pub null_fields: usize,
    pub out_of_range: usize,
    pub kept: usize,
}

/// Output table plus its accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CovidTable {
    pub rows: Vec<CovidRow>,
    pub stats: TransformStats,
}

impl CovidTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Inner-join `cases` against the configured part of `counties`, drop nulls and
/// rows outside `bounds`.
pub fn join_and_filter(cases: &[CaseRow], counties: &CountyTable, fips: &[String], bounds: &DateBounds) -> CovidTable {
    let index = counties.index_by_name(fips);
    let mut stats = TransformStats {
        rows_read: cases.len(),
        ..TransformStats::default()
    };
    let mut rows = Vec::new();

    for case in cases {
        let Some(matches) = case.county.as_deref().and_then(|name| index.get(name)) else {
            stats.unmatched += 1;
            continue;
        };

        let (Some(date), Some(cases_cum), Some(death_cum)) = (case.report_date, case.cases_cum, case.death_cum) else {
            stats.null_fields += 1;
            continue;
        };

        if !bounds.contains(date) {
            stats.out_of_range += 1;
            continue;
        }

        for county in matches {
            rows.push(CovidRow {
                date,
                fips: county.fips.clone(),
                county: county.county.clone(),
                cases: cases_cum,
                deaths: death_cum,
            });
        }
    }

    rows.sort();
    stats.kept = rows.len();
    debug!(?stats, "transform finished");

    CovidTable { rows, stats }
}
