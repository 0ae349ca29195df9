//! Client for the upstream password authority.
//!
//! One POST per call. No retries, no timeout beyond the transport default.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

/// Upstream call failures.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Authority answered with a non-2xx status
    #[error("Upstream authority responded with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Connection refused, DNS failure, broken stream
    #[error("Upstream authority unreachable: {0}")]
    Transport(String),

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Raw 2xx answer from the authority. Parsing is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: String,
}

/// The seam between the router and the authority.
#[async_trait]
pub trait Authority: Send + Sync {
    /// POST `payload` as JSON to `path` on the authority.
    async fn post_json(&self, path: &str, payload: &Value) -> Result<UpstreamReply, UpstreamError>;
}

/// [`Authority`] over plain HTTP.
#[derive(Debug, Clone)]
pub struct HttpAuthority {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthority {
    /// Authority at `http://{host}:{port}`.
    pub fn new(host: &str, port: u16) -> Result<Self, UpstreamError> {
        Self::with_base_url(format!("http://{host}:{port}"))
    }

    /// The authority is addressed directly; system proxy settings are ignored.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Authority for HttpAuthority {
    async fn post_json(&self, path: &str, payload: &Value) -> Result<UpstreamReply, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Posting to upstream authority");

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                error!(%url, error = %e, "Upstream request failed");
                UpstreamError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(%url, error = %e, "Failed to read upstream response body");
            UpstreamError::Transport(e.to_string())
        })?;

        info!(%url, status = status.as_u16(), "Upstream authority answered");

        if status.is_success() {
            Ok(UpstreamReply {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(UpstreamError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}
