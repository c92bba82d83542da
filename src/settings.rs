//! Source constants and runtime settings.
//!
//! Defaults point at the Georgia DPH archive and a scratch directory under the
//! system temp dir. `.env` and the process environment may override them, and
//! CLI flags override the environment.

use std::path::{Path, PathBuf};

/// Published archive of the Georgia DPH COVID-19 dataset.
pub const ZIP_URL: &str = "https://ga-covid19.ondemand.sas.com/docs/ga_covid_data.zip";

/// Scratch directory name (under the system temp dir by default).
pub const SCRATCH_DIR_NAME: &str = "GA-covid_data";
pub const ZIP_FILE_NAME: &str = "ga_covid_data.zip";
pub const UNZIP_DIR_NAME: &str = "ga_covid_data";
/// Case/death table inside the archive, keyed by report date.
pub const CSV_FILE_NAME: &str = "epicurve_rpt_date.csv";

/// Namespace key of this source's block in the pipe parameters.
pub const PARAMETERS_KEY: &str = "GA-covid";

/// State FIPS prefix every configured county code must carry (Georgia).
pub const FIPS_PREFIX: &str = "13";

const ENV_ZIP_URL: &str = "GA_COVID_ZIP_URL";
const ENV_SCRATCH_DIR: &str = "GA_COVID_SCRATCH_DIR";
const ENV_COUNTIES: &str = "GA_COVID_COUNTIES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub zip_url: String,
    pub scratch_dir: PathBuf,
    /// Reference table override; `None` uses the embedded table.
    pub counties_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zip_url: ZIP_URL.to_string(),
            scratch_dir: std::env::temp_dir().join(SCRATCH_DIR_NAME),
            counties_path: None,
        }
    }
}

impl Settings {
    /// Build settings from `.env` and the environment, falling back to defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut settings = Self::default();
        if let Some(url) = non_empty_var(ENV_ZIP_URL) {
            settings.zip_url = url;
        }
        if let Some(dir) = non_empty_var(ENV_SCRATCH_DIR) {
            settings.scratch_dir = PathBuf::from(dir);
        }
        if let Some(path) = non_empty_var(ENV_COUNTIES) {
            settings.counties_path = Some(PathBuf::from(path));
        }
        settings
    }

    /// Settings rooted at an explicit scratch directory (tests, one-off runs).
    pub fn with_scratch_dir(scratch_dir: impl AsRef<Path>) -> Self {
        Self {
            scratch_dir: scratch_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn zip_path(&self) -> PathBuf {
        self.scratch_dir.join(ZIP_FILE_NAME)
    }

    pub fn unzip_path(&self) -> PathBuf {
        self.scratch_dir.join(UNZIP_DIR_NAME)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.unzip_path().join(CSV_FILE_NAME)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_layout_hangs_off_scratch_dir() {
        let settings = Settings::with_scratch_dir("/tmp/ga");
        assert_eq!(settings.zip_path(), PathBuf::from("/tmp/ga/ga_covid_data.zip"));
        assert_eq!(
            settings.csv_path(),
            PathBuf::from("/tmp/ga/ga_covid_data/epicurve_rpt_date.csv")
        );
        assert_eq!(settings.zip_url, ZIP_URL);
    }
}
