//! The host pipe seam and a file-backed stand-in.
//!
//! The host framework owns pipes: their parameters, their sync-time
//! bookkeeping and their storage. The plugin only needs read access to the
//! first two, which is all `Pipe` exposes. `LocalPipe` keeps the same data in
//! a JSON file so the binary can play the host:
//!
//! ```json
//! {
//!   "name": "ga-covid-metro",
//!   "parameters": { "columns": { ... }, "GA-covid": { "fips": ["13089"] } },
//!   "sync_time": "2022-01-01T00:00:00"
//! }
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::PipeParameters;
use crate::error::AppError;

pub trait Pipe {
    fn name(&self) -> &str;

    /// Parameters persisted at registration; `None` before registration.
    fn parameters(&self) -> Option<&PipeParameters>;

    /// Latest timestamp the host has already synced, if any.
    fn sync_time(&self, debug: bool) -> Option<NaiveDateTime>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<PipeParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_time: Option<NaiveDateTime>,
}

/// A pipe whose state lives in a JSON file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPipe {
    path: PathBuf,
    file: PipeFile,
}

impl LocalPipe {
    /// A fresh, unregistered pipe that will be saved at `path`.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            file: PipeFile {
                name: name.into(),
                parameters: None,
                sync_time: None,
            },
        }
    }

    pub fn open(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path)
            .map_err(|e| AppError::input(format!("Failed to open pipe file '{}': {e}", path.display())))?;
        let contents: PipeFile = serde_json::from_reader(file)
            .map_err(|e| AppError::input(format!("Invalid pipe file '{}': {e}", path.display())))?;
        debug!(path = %path.display(), name = %contents.name, "opened pipe");
        Ok(Self {
            path: path.to_path_buf(),
            file: contents,
        })
    }

    /// Open `path` if it exists, otherwise start a new pipe there.
    pub fn open_or_new(path: &Path, name: &str) -> Result<Self, AppError> {
        if path.exists() {
            Self::open(path)
        } else {
            Ok(Self::new(path, name))
        }
    }

    pub fn save(&self) -> Result<(), AppError> {
        let file = File::create(&self.path).map_err(|e| {
            AppError::input(format!("Failed to create pipe file '{}': {e}", self.path.display()))
        })?;
        serde_json::to_writer_pretty(file, &self.file)
            .map_err(|e| AppError::input(format!("Failed to write pipe file: {e}")))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.file.name = name.into();
    }

    pub fn set_parameters(&mut self, parameters: PipeParameters) {
        self.file.parameters = Some(parameters);
    }

    pub fn set_sync_time(&mut self, sync_time: Option<NaiveDateTime>) {
        self.file.sync_time = sync_time;
    }
}

impl Pipe for LocalPipe {
    fn name(&self) -> &str {
        &self.file.name
    }

    fn parameters(&self) -> Option<&PipeParameters> {
        self.file.parameters.as_ref()
    }

    fn sync_time(&self, debug: bool) -> Option<NaiveDateTime> {
        if debug {
            debug!(pipe = %self.file.name, sync_time = ?self.file.sync_time, "sync time lookup");
        }
        self.file.sync_time
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn save_then_open_keeps_parameters_and_sync_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipe.json");

        let mut pipe = LocalPipe::new(&path, "metro");
        pipe.set_parameters(PipeParameters::new(vec!["13089".to_string()]));
        let sync = NaiveDate::from_ymd_opt(2022, 1, 2).unwrap().and_hms_opt(0, 0, 0);
        pipe.set_sync_time(sync);
        pipe.save().unwrap();

        let reopened = LocalPipe::open(&path).unwrap();
        assert_eq!(reopened.name(), "metro");
        assert_eq!(reopened.parameters().unwrap().fips(), ["13089".to_string()]);
        assert_eq!(reopened.sync_time(false), sync);
    }

    #[test]
    fn reads_hand_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipe.json");
        std::fs::write(
            &path,
            r#"{"name":"p","parameters":{"columns":{"datetime":"date","id":"fips","value":"cases"},"GA-covid":{"fips":["13121"]}}}"#,
        )
        .unwrap();

        let pipe = LocalPipe::open(&path).unwrap();
        assert_eq!(pipe.parameters().unwrap().fips(), ["13121".to_string()]);
        assert_eq!(pipe.sync_time(true), None);
    }

    #[test]
    fn malformed_file_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipe.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(LocalPipe::open(&path).unwrap_err().exit_code(), 2);
    }
}
