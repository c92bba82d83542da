//! ZIP extraction into the scratch directory.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::AppError;

/// Extract every entry of `zip_path` under `dest`, overwriting existing files.
///
/// Returns the paths written. Entries whose names would escape `dest` make
/// the archive malformed.
pub fn extract_all(zip_path: &Path, dest: &Path) -> Result<Vec<PathBuf>, AppError> {
    let file = File::open(zip_path).map_err(|e| {
        AppError::input(format!("Failed to open archive '{}': {e}", zip_path.display()))
    })?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| AppError::format(format!("'{}' is not a valid ZIP archive: {e}", zip_path.display())))?;

    fs::create_dir_all(dest).map_err(|e| {
        AppError::input(format!("Failed to create extraction dir '{}': {e}", dest.display()))
    })?;

    let mut written = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| AppError::format(format!("Failed to read archive entry #{i}: {e}")))?;

        let Some(relative) = entry.enclosed_name() else {
            return Err(AppError::format(format!(
                "Archive entry '{}' points outside the extraction directory.",
                entry.name()
            )));
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| {
                AppError::input(format!("Failed to create '{}': {e}", out_path.display()))
            })?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::input(format!("Failed to create '{}': {e}", parent.display()))
            })?;
        }

        let mut out = File::create(&out_path).map_err(|e| {
            AppError::input(format!("Failed to create '{}': {e}", out_path.display()))
        })?;
        io::copy(&mut entry, &mut out).map_err(|e| {
            AppError::format(format!("Failed to extract '{}': {e}", entry.name()))
        })?;

        written.push(out_path);
    }

    if written.is_empty() {
        warn!(archive = %zip_path.display(), "archive contained no files");
    }
    debug!(files = written.len(), dest = %dest.display(), "archive extracted");
    Ok(written)
}
