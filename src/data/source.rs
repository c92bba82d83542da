//! Georgia DPH archive download.

use std::fs::File;
use std::path::Path;

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::error::AppError;

/// Blocking HTTP client for the published archive.
pub struct ArchiveClient {
    client: Client,
    url: String,
}

impl ArchiveClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// GET the archive and write it to `dest`, replacing any previous copy.
    ///
    /// Returns the number of bytes written.
    pub fn download_to(&self, dest: &Path) -> Result<u64, AppError> {
        info!(url = %self.url, "downloading archive");

        let mut resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| AppError::transport(format!("Archive request to {} failed: {e}", self.url)))?;

        if !resp.status().is_success() {
            return Err(AppError::transport(format!(
                "Archive request to {} failed with status {}.",
                self.url,
                resp.status()
            )));
        }

        let mut file = File::create(dest).map_err(|e| {
            AppError::input(format!("Failed to create archive file '{}': {e}", dest.display()))
        })?;
        let bytes = resp
            .copy_to(&mut file)
            .map_err(|e| AppError::transport(format!("Failed to read archive body: {e}")))?;

        debug!(path = %dest.display(), bytes, "archive saved");
        Ok(bytes)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::serve_once;
    use super::*;

    #[test]
    fn download_overwrites_previous_copy() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("ga_covid_data.zip");
        std::fs::write(&dest, b"stale contents that are longer than the new body").unwrap();

        let (url, server) = serve_once("200 OK", b"fresh".to_vec());
        let bytes = ArchiveClient::new(url).download_to(&dest).unwrap();
        server.join().unwrap();

        assert_eq!(bytes, 5);
        assert_eq!(std::fs::read(&dest).unwrap(), b"fresh");
    }

    #[test]
    fn non_success_status_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let (url, server) = serve_once("404 Not Found", b"missing".to_vec());
        let err = ArchiveClient::new(url).download_to(&dir.path().join("a.zip")).unwrap_err();
        server.join().unwrap();

        assert_eq!(err.exit_code(), 4);
        assert!(err.message().contains("404"), "{err}");
    }

    #[test]
    fn unreachable_host_is_transport_error() {
        // Bind then drop to get a local port with nothing listening.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let dir = tempfile::tempdir().unwrap();
        let err = ArchiveClient::new(format!("http://127.0.0.1:{port}/x.zip"))
            .download_to(&dir.path().join("a.zip"))
            .unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
