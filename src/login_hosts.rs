//! Side-channel lookup of the most recently observed login hostname.
//!
//! The extension host keeps a small document (`pages.json`) of the form
//! `{ "login_titles": ["accounts.example.com", ...] }`. Only the first
//! entry is consulted. A missing or unusable document means no enrichment.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct LoginHostsDocument {
    #[serde(default)]
    login_titles: Vec<serde_json::Value>,
}

/// Reader for the login hostname side document.
#[derive(Debug, Clone)]
pub struct LoginHosts {
    path: PathBuf,
}

impl LoginHosts {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// First entry of `login_titles`, or `None` if there is nothing usable.
    pub async fn most_recent(&self) -> Option<String> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Login hosts document not present");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read login hosts document");
                return None;
            }
        };

        let doc: LoginHostsDocument = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to parse login hosts document");
                return None;
            }
        };

        match doc.login_titles.first().and_then(|v| v.as_str()) {
            Some(hostname) => {
                debug!(hostname, "Found most recent login hostname");
                Some(hostname.to_string())
            }
            None => {
                debug!(path = %self.path.display(), "No login hostname in document");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn lookup(content: Option<&str>) -> Option<String> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages.json");
        if let Some(content) = content {
            std::fs::write(&path, content).unwrap();
        }
        LoginHosts::new(path).most_recent().await
    }

    #[tokio::test]
    async fn test_first_entry_wins() {
        let found = lookup(Some(r#"{"login_titles": ["a.example.com", "b.example.com"]}"#)).await;
        assert_eq!(found.as_deref(), Some("a.example.com"));
    }

    #[tokio::test]
    async fn test_missing_document_is_not_an_error() {
        assert_eq!(lookup(None).await, None);
    }

    #[tokio::test]
    async fn test_empty_or_malformed_documents_yield_none() {
        assert_eq!(lookup(Some(r#"{"login_titles": []}"#)).await, None);
        assert_eq!(lookup(Some(r#"{}"#)).await, None);
        assert_eq!(lookup(Some("")).await, None);
        assert_eq!(lookup(Some("not json")).await, None);
        assert_eq!(lookup(Some(r#"{"login_titles": [42]}"#)).await, None);
    }
}
