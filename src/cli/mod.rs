//! Command-line parsing for the GA-covid data source.
//!
//! The binary stands in for the host framework: it keeps pipe state in a local
//! JSON file and drives `register` and `fetch` against it.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Parser, Subcommand};

pub mod prompt;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ga-covid", version, about = "Georgia DPH county COVID-19 data source")]
pub struct Cli {
    #[command(flatten)]
    pub overrides: SettingsArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively choose county FIPS codes and save them in a pipe file.
    Register(RegisterArgs),
    /// Download, join and filter the dataset for a registered pipe.
    Fetch(FetchArgs),
    /// List the county reference table.
    Counties,
}

/// Overrides for `.env` / environment settings.
#[derive(Debug, Args, Clone, Default)]
pub struct SettingsArgs {
    /// Archive URL.
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Scratch directory for the downloaded and extracted archive.
    #[arg(long, global = true, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// County reference CSV (`fips,county,state`) replacing the built-in table.
    #[arg(long, global = true, value_name = "CSV")]
    pub counties: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct RegisterArgs {
    /// Pipe file to create or update.
    #[arg(long, value_name = "JSON")]
    pub pipe: PathBuf,

    /// Pipe name (defaults to the file stem).
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    /// Pipe file written by `ga-covid register`.
    #[arg(long, value_name = "JSON")]
    pub pipe: PathBuf,

    /// Keep rows reported on or after this date (defaults to the pipe's sync time).
    #[arg(long, value_parser = parse_datetime_arg)]
    pub begin: Option<NaiveDateTime>,

    /// Keep rows reported on or before this date.
    #[arg(long, value_parser = parse_datetime_arg)]
    pub end: Option<NaiveDateTime>,

    /// Verbose diagnostics.
    #[arg(long)]
    pub debug: bool,

    /// Write all rows to a CSV file.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Rows to print to the terminal.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

/// Accept `YYYY-MM-DD` or an ISO datetime.
pub fn parse_datetime_arg(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::default()));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt);
        }
    }
    Err(format!("invalid date '{raw}' (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)"))
}
