//! Write-only audit trail of capture payloads.
//!
//! Each payload lands in its own `page_data_<timestamp>.json` file under the
//! configured directory. Files are never read back or listed.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

const FILE_PREFIX: &str = "page_data_";
const FILE_SUFFIX: &str = ".json";

/// Temp store failures. Fatal for the request that hit them.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Directory could not be created
    #[error("Failed to create temp directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record could not be written
    #[error("Failed to write capture file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record could not be serialized
    #[error("Failed to serialize capture payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Directory of timestamp-named capture files.
#[derive(Debug, Clone)]
pub struct TempStore {
    dir: PathBuf,
}

impl TempStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory (recursively) if it is missing. Idempotent.
    pub async fn ensure_dir(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| {
                error!(dir = %self.dir.display(), error = %source, "Failed to ensure temp directory");
                StoreError::CreateDir {
                    path: self.dir.clone(),
                    source,
                }
            })?;
        debug!(dir = %self.dir.display(), "Temp directory ready");
        Ok(())
    }

    /// Write `payload` pretty-printed to a new file and return its path.
    pub async fn record(&self, payload: &Value) -> Result<PathBuf, StoreError> {
        self.ensure_dir().await?;

        let path = self.dir.join(file_name_for(Utc::now()));
        let content = serde_json::to_string_pretty(payload)?;

        tokio::fs::write(&path, content).await.map_err(|source| {
            error!(file = %path.display(), error = %source, "Failed to write capture file");
            StoreError::Write {
                path: path.clone(),
                source,
            }
        })?;

        info!(file = %path.display(), "Recorded capture payload");
        Ok(path)
    }
}

/// File name for a record captured at `at`.
///
/// RFC 3339 UTC with microseconds, `:` and `.` replaced by `-`, so names
/// sort in capture order and are safe on every filesystem.
pub fn file_name_for(at: DateTime<Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Micros, true)
        .replace([':', '.'], "-");
    format!("{FILE_PREFIX}{stamp}{FILE_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_file_name_is_filesystem_safe() {
        let at = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap();
        let name = file_name_for(at);
        assert_eq!(name, "page_data_2025-03-09T14-05-07-000000Z.json");
        assert!(!name.contains(':'));
    }

    #[test]
    fn test_file_names_sort_by_time() {
        let earlier = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap();
        let later = earlier + chrono::Duration::microseconds(1);
        assert!(file_name_for(earlier) < file_name_for(later));
    }

    #[tokio::test]
    async fn test_record_creates_nested_dir_and_pretty_prints() {
        let root = tempfile::tempdir().unwrap();
        let store = TempStore::new(root.path().join("a").join("b"));
        let payload = json!({ "hostname": "example.com", "isLoginPage": true });

        let path = store.record(&payload).await.unwrap();

        assert!(path.starts_with(store.dir()));
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, serde_json::to_string_pretty(&payload).unwrap());
        assert!(written.contains('\n'));
    }

    #[tokio::test]
    async fn test_same_payload_twice_gives_two_files() {
        let root = tempfile::tempdir().unwrap();
        let store = TempStore::new(root.path());
        let payload = json!({ "hostname": "example.com" });

        let first = store.record(&payload).await.unwrap();
        let second = store.record(&payload).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_record_fails_when_dir_is_a_file() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let store = TempStore::new(blocker.join("temp_data"));
        let err = store.record(&json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::CreateDir { .. }));
    }
}
