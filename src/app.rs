//! Top-level application orchestration.
//!
//! `src/main.rs` only maps errors to exit codes; this module:
//! - parses CLI arguments
//! - resolves settings (`.env`, environment, flags)
//! - runs the plugin entry points against a local pipe file
//! - prints reports and writes optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command, FetchArgs, RegisterArgs, SettingsArgs};
use crate::data::CountyTable;
use crate::error::AppError;
use crate::pipe::{LocalPipe, Pipe};
use crate::settings::Settings;

pub mod plugin;

/// Entry point for the `ga-covid` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let debug = matches!(&cli.command, Command::Fetch(args) if args.debug);
    crate::logging::init_logging(debug);

    let settings = resolve_settings(Settings::from_env(), &cli.overrides);

    match cli.command {
        Command::Register(args) => handle_register(args),
        Command::Fetch(args) => handle_fetch(args, &settings),
        Command::Counties => handle_counties(&settings),
    }
}

/// Apply CLI overrides on top of environment settings.
pub fn resolve_settings(mut settings: Settings, overrides: &SettingsArgs) -> Settings {
    if let Some(url) = &overrides.url {
        settings.zip_url = url.clone();
    }
    if let Some(dir) = &overrides.scratch_dir {
        settings.scratch_dir = dir.clone();
    }
    if let Some(path) = &overrides.counties {
        settings.counties_path = Some(path.clone());
    }
    settings
}

fn handle_register(args: RegisterArgs) -> Result<(), AppError> {
    let default_name = args
        .pipe
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("GA-covid")
        .to_string();
    let mut pipe = LocalPipe::open_or_new(&args.pipe, &default_name)?;
    if let Some(name) = args.name {
        pipe.set_name(name);
    }

    let params = plugin::register(&pipe, crate::cli::prompt::prompt_for_fips)?;
    pipe.set_parameters(params);
    pipe.save()?;

    info!(path = %pipe.path().display(), "pipe saved");
    println!("Registered pipe '{}' in {}", pipe.name(), pipe.path().display());
    Ok(())
}

fn handle_fetch(args: FetchArgs, settings: &Settings) -> Result<(), AppError> {
    let pipe = LocalPipe::open(&args.pipe)?;
    let table = plugin::fetch(&pipe, args.begin, args.end, args.debug, settings)?;

    println!("{}", crate::report::format_fetch_summary(pipe.name(), &table));
    if args.limit > 0 && !table.is_empty() {
        println!("{}", crate::report::format_rows(&table.rows, args.limit));
    }

    if let Some(path) = &args.export {
        crate::io::export::write_rows_csv(path, &table.rows)?;
        info!(path = %path.display(), rows = table.len(), "rows exported");
    }

    Ok(())
}

fn handle_counties(settings: &Settings) -> Result<(), AppError> {
    let counties = CountyTable::load(settings.counties_path.as_deref())?;
    print!("{}", crate::report::format_counties(&counties));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn flags_override_environment_settings() {
        let base = Settings::with_scratch_dir("/tmp/env-dir");
        let overrides = SettingsArgs {
            url: Some("http://localhost/a.zip".to_string()),
            scratch_dir: None,
            counties: Some(PathBuf::from("c.csv")),
        };
        let settings = resolve_settings(base, &overrides);

        assert_eq!(settings.zip_url, "http://localhost/a.zip");
        assert_eq!(settings.scratch_dir, PathBuf::from("/tmp/env-dir"));
        assert_eq!(settings.counties_path, Some(PathBuf::from("c.csv")));
    }
}
