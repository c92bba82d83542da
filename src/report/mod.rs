//! Terminal formatting for fetch results and the reference table.
//!
//! Formatting lives here so the pipeline code stays free of presentation.

use std::collections::BTreeMap;

use crate::data::CountyTable;
use crate::domain::CovidRow;
use crate::transform::CovidTable;

/// Run summary: row accounting, date span and per-county latest totals.
pub fn format_fetch_summary(pipe_name: &str, table: &CovidTable) -> String {
    let stats = &table.stats;
    let mut out = String::new();

    out.push_str(&format!("=== ga-covid fetch: {pipe_name} ===\n"));
    out.push_str(&format!(
        "Rows: read={} kept={} | dropped: unmatched={} null={} out-of-range={}\n",
        stats.rows_read, stats.kept, stats.unmatched, stats.null_fields, stats.out_of_range
    ));

    let (Some(first), Some(last)) = (table.rows.first(), table.rows.last()) else {
        out.push_str("No rows matched.\n");
        return out;
    };
    out.push_str(&format!("Dates: {} .. {}\n", first.date, last.date));

    // Rows are date-sorted, so the last row seen per county is its latest.
    let mut latest: BTreeMap<(&str, &str), &CovidRow> = BTreeMap::new();
    for row in &table.rows {
        latest.insert((row.fips.as_str(), row.county.as_str()), row);
    }

    out.push_str("\nLatest cumulative totals:\n");
    for ((fips, county), row) in latest {
        out.push_str(&format!(
            "  {fips} {county:<16} {date} cases={cases:>9} deaths={deaths:>7}\n",
            date = row.date,
            cases = row.cases,
            deaths = row.deaths,
        ));
    }
    out
}

/// The first `limit` rows as an aligned table.
pub fn format_rows(rows: &[CovidRow], limit: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<10}  {:<5}  {:<16}  {:>9}  {:>7}\n",
        "date", "fips", "county", "cases", "deaths"
    ));
    for row in rows.iter().take(limit) {
        out.push_str(&format!(
            "{:<10}  {:<5}  {:<16}  {:>9}  {:>7}\n",
            row.date.to_string(),
            row.fips,
            row.county,
            row.cases,
            row.deaths
        ));
    }
    if rows.len() > limit {
        out.push_str(&format!("... {} more row(s)\n", rows.len() - limit));
    }
    out
}

pub fn format_counties(counties: &CountyTable) -> String {
    let mut out = String::new();
    for c in counties.rows() {
        out.push_str(&format!("{}  {:<16}  {}\n", c.fips, c.county, c.state));
    }
    out
}
