// SPDX-License-Identifier: MPL-2.0
//! Local file fetching.

use super::Fetcher;
use crate::error::FetchError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Reads local paths and `file://` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl FileFetcher {
    /// Converts a location into a filesystem path.
    #[must_use]
    pub fn path_of(location: &str) -> PathBuf {
        let path = location
            .strip_prefix("file://localhost")
            .or_else(|| location.strip_prefix("file://"))
            .unwrap_or(location);
        PathBuf::from(path)
    }
}

#[async_trait]
impl Fetcher for FileFetcher {
    async fn fetch_bytes(&self, location: &str) -> Result<Vec<u8>, FetchError> {
        let path = Self::path_of(location);
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => FetchError::NotFound(path.display().to_string()),
            _ => FetchError::Io(format!("{}: {e}", path.display())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_urls_map_to_paths() {
        assert_eq!(FileFetcher::path_of("file:///tmp/a.zip"), PathBuf::from("/tmp/a.zip"));
        assert_eq!(
            FileFetcher::path_of("file://localhost/tmp/a.zip"),
            PathBuf::from("/tmp/a.zip")
        );
        assert_eq!(FileFetcher::path_of("rel/a.png"), PathBuf::from("rel/a.png"));
    }

    #[tokio::test]
    async fn reads_existing_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("frame.dcm");
        std::fs::write(&path, b"bytes").expect("write");

        let bytes = FileFetcher
            .fetch_bytes(path.to_str().expect("utf-8 path"))
            .await
            .expect("read");
        assert_eq!(bytes, b"bytes");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("missing.zip");

        let err = FileFetcher
            .fetch_bytes(path.to_str().expect("utf-8 path"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NotFound(_)));
        assert!(!err.is_retryable());
    }
}
