//! The two plugin entry points the host calls: `register` and `fetch`.
//!
//! `fetch` runs one linear, blocking pipeline:
//! scratch dir -> download -> extract -> load CSV + reference table -> join/filter

use std::fs;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::data::{archive, ArchiveClient, CountyTable};
use crate::domain::{DateBounds, PipeParameters};
use crate::error::AppError;
use crate::io::ingest::load_case_rows;
use crate::pipe::Pipe;
use crate::settings::Settings;
use crate::transform::{join_and_filter, CovidTable};

/// Collect FIPS codes through `prompt` and build the pipe parameters.
///
/// `prompt` must only return validated lists; see `cli::prompt::prompt_for_fips`.
pub fn register<P, F>(pipe: &P, prompt: F) -> Result<PipeParameters, AppError>
where
    P: Pipe + ?Sized,
    F: FnOnce() -> Result<Vec<String>, AppError>,
{
    info!(pipe = pipe.name(), "registering pipe");
    let fips = prompt()?;
    debug!(?fips, "FIPS codes accepted");
    Ok(PipeParameters::new(fips))
}

/// Download, extract, join and filter the dataset for `pipe`.
///
/// When `begin` is `None` the pipe's sync time is the lower bound.
pub fn fetch<P>(
    pipe: &P,
    begin: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    debug: bool,
    settings: &Settings,
) -> Result<CovidTable, AppError>
where
    P: Pipe + ?Sized,
{
    let params = pipe.parameters().ok_or_else(|| {
        AppError::input(format!(
            "Pipe '{}' has no '{}' parameters; run `ga-covid register` first.",
            pipe.name(),
            PipeParameters::namespace()
        ))
    })?;

    fs::create_dir_all(&settings.scratch_dir).map_err(|e| {
        AppError::input(format!(
            "Failed to create scratch dir '{}': {e}",
            settings.scratch_dir.display()
        ))
    })?;

    let zip_path = settings.zip_path();
    ArchiveClient::new(settings.zip_url.as_str()).download_to(&zip_path)?;

    // Start from an empty extraction dir so files from an older archive
    // cannot stand in for ones the new archive lacks.
    let unzip_path = settings.unzip_path();
    if unzip_path.exists() {
        fs::remove_dir_all(&unzip_path).map_err(|e| {
            AppError::input(format!(
                "Failed to clear extraction dir '{}': {e}",
                unzip_path.display()
            ))
        })?;
    }
    let extracted = archive::extract_all(&zip_path, &unzip_path)?;

    let csv_path = settings.csv_path();
    if !extracted.contains(&csv_path) {
        return Err(AppError::format(format!(
            "Archive did not contain the expected CSV '{}'.",
            csv_path.display()
        )));
    }
    let cases = load_case_rows(&csv_path)?;
    let counties = CountyTable::load(settings.counties_path.as_deref())?;

    let begin = begin.or_else(|| pipe.sync_time(debug));
    let bounds = DateBounds::from_datetimes(begin, end);
    if debug {
        debug!(?bounds, fips = ?params.fips(), "applying filters");
    }

    let table = join_and_filter(&cases.rows, &counties, params.fips(), &bounds);
    info!(
        pipe = pipe.name(),
        rows = table.len(),
        read = table.stats.rows_read,
        "fetch finished"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;

    use super::*;
    use crate::data::archive::testing::zip_bytes;
    use crate::data::source::testing::serve_once;
    use crate::pipe::LocalPipe;

    const EPICURVE: &str = "measure,county,report_date,cases,deaths,cases_cum,death_cum\n\
        state_total,Georgia,2022-01-01,5,0,9000,100\n\
        county_stats,DeKalb,2022-01-01,5,0,500,10\n\
        county_stats,DeKalb,2022-01-02,20,1,520,11\n\
        county_stats,Fulton,2022-01-02,30,2,800,20\n\
        county_stats,DeKalb,,1,0,521,11\n";

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn pipe_with(dir: &std::path::Path, fips: &[&str]) -> LocalPipe {
        let mut pipe = LocalPipe::new(dir.join("pipe.json"), "metro");
        pipe.set_parameters(PipeParameters::new(fips.iter().map(|s| s.to_string()).collect()));
        pipe
    }

    fn settings_for(dir: &std::path::Path, url: String) -> Settings {
        let mut settings = Settings::with_scratch_dir(dir.join("scratch"));
        settings.zip_url = url;
        settings
    }

    #[test]
    fn register_wraps_prompted_codes() {
        let pipe = LocalPipe::new("unused.json", "metro");
        let params = register(&pipe, || Ok(vec!["13089".to_string()])).unwrap();
        assert_eq!(params, PipeParameters::new(vec!["13089".to_string()]));
    }

    #[test]
    fn register_propagates_prompt_errors() {
        let pipe = LocalPipe::new("unused.json", "metro");
        let err = register(&pipe, || Err(AppError::input("closed"))).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn fetch_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let (url, server) = serve_once("200 OK", zip_bytes(&[("epicurve_rpt_date.csv", EPICURVE)]));
        let settings = settings_for(dir.path(), url);
        let pipe = pipe_with(dir.path(), &["13089"]);

        let table = fetch(&pipe, None, None, false, &settings).unwrap();
        server.join().unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.rows.iter().all(|r| r.fips == "13089" && r.county == "DeKalb"));
        assert_eq!(table.rows[0].date, d(2022, 1, 1));
        assert_eq!((table.rows[1].cases, table.rows[1].deaths), (520, 11));
        assert_eq!(table.stats.null_fields, 1);
        assert!(settings.zip_path().is_file());
    }

    #[test]
    fn fetch_defaults_begin_to_sync_time() {
        let dir = tempfile::tempdir().unwrap();
        let (url, server) = serve_once("200 OK", zip_bytes(&[("epicurve_rpt_date.csv", EPICURVE)]));
        let settings = settings_for(dir.path(), url);
        let mut pipe = pipe_with(dir.path(), &["13089", "13121"]);
        pipe.set_sync_time(d(2022, 1, 2).and_hms_opt(8, 0, 0));

        let table = fetch(&pipe, None, None, true, &settings).unwrap();
        server.join().unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.rows.iter().all(|r| r.date == d(2022, 1, 2)));
        assert_eq!(table.stats.out_of_range, 1);
    }

    #[test]
    fn explicit_begin_overrides_sync_time() {
        let dir = tempfile::tempdir().unwrap();
        let (url, server) = serve_once("200 OK", zip_bytes(&[("epicurve_rpt_date.csv", EPICURVE)]));
        let settings = settings_for(dir.path(), url);
        let mut pipe = pipe_with(dir.path(), &["13089"]);
        pipe.set_sync_time(d(2022, 1, 2).and_hms_opt(0, 0, 0));

        let begin = d(2021, 12, 1).and_hms_opt(0, 0, 0);
        let end = d(2022, 1, 1).and_hms_opt(0, 0, 0);
        let table = fetch(&pipe, begin, end, false, &settings).unwrap();
        server.join().unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].date, d(2022, 1, 1));
    }

    #[test]
    fn unknown_code_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let (url, server) = serve_once("200 OK", zip_bytes(&[("epicurve_rpt_date.csv", EPICURVE)]));
        let settings = settings_for(dir.path(), url);
        let pipe = pipe_with(dir.path(), &["13999"]);

        let table = fetch(&pipe, None, None, false, &settings).unwrap();
        server.join().unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn archive_without_csv_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let (url, server) = serve_once("200 OK", zip_bytes(&[("other.csv", "a,b\n1,2\n")]));
        let settings = settings_for(dir.path(), url);
        let pipe = pipe_with(dir.path(), &["13089"]);

        let err = fetch(&pipe, None, None, false, &settings).unwrap_err();
        server.join().unwrap();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn non_zip_body_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let (url, server) = serve_once("200 OK", b"<html>down for maintenance</html>".to_vec());
        let settings = settings_for(dir.path(), url);
        let pipe = pipe_with(dir.path(), &["13089"]);

        let err = fetch(&pipe, None, None, false, &settings).unwrap_err();
        server.join().unwrap();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn stale_extracted_csv_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let seeded = Settings::with_scratch_dir(dir.path().join("scratch"));
        fs::create_dir_all(seeded.unzip_path()).unwrap();
        fs::write(
            seeded.csv_path(),
            "county,report_date,cases_cum,death_cum\nDeKalb,2020-01-01,1,1\n",
        )
        .unwrap();

        let (url, server) = serve_once("200 OK", zip_bytes(&[("epicurve_rpt_date.csv", EPICURVE)]));
        let settings = settings_for(dir.path(), url);
        let pipe = pipe_with(dir.path(), &["13089"]);

        let table = fetch(&pipe, None, None, false, &settings).unwrap();
        server.join().unwrap();
        assert!(table.rows.iter().all(|r| r.date >= d(2022, 1, 1)));
    }

    #[test]
    fn stale_csv_does_not_hide_missing_csv() {
        let dir = tempfile::tempdir().unwrap();
        let seeded = Settings::with_scratch_dir(dir.path().join("scratch"));
        fs::create_dir_all(seeded.unzip_path()).unwrap();
        fs::write(
            seeded.csv_path(),
            "county,report_date,cases_cum,death_cum\nDeKalb,2020-01-01,1,1\n",
        )
        .unwrap();

        let (url, server) = serve_once("200 OK", zip_bytes(&[("other.csv", "a,b\n1,2\n")]));
        let settings = settings_for(dir.path(), url);
        let pipe = pipe_with(dir.path(), &["13089"]);

        let err = fetch(&pipe, None, None, false, &settings).unwrap_err();
        server.join().unwrap();
        assert_eq!(err.exit_code(), 3);
        assert!(!seeded.csv_path().exists());
    }

    #[test]
    fn unregistered_pipe_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let pipe = LocalPipe::new(dir.path().join("pipe.json"), "metro");
        let settings = Settings::with_scratch_dir(dir.path().join("scratch"));

        let err = fetch(&pipe, None, None, false, &settings).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
