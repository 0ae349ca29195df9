//! Relay error taxonomy and its mapping onto caller-facing replies.
//!
//! | Kind | Status | Recovered locally |
//! |---|---|---|
//! | Unknown route | 404 | yes |
//! | Malformed JSON / missing field | 400 | yes, nothing forwarded |
//! | Temp store I/O | 500 | no, request aborted before forwarding |
//! | Upstream transport / non-2xx | 500 | no retries |

use http::StatusCode;
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::ConfigError;
use crate::temp_store::StoreError;
use crate::upstream::UpstreamError;

/// Errors a single relay request can end in.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No route for this method and path
    #[error("Not Found")]
    NotFound,

    /// Body is not JSON
    #[error("Invalid JSON in request body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A required field is absent
    #[error("{message}")]
    MissingFields { message: &'static str },

    /// Capture payload could not be recorded
    #[error("Failed to record capture payload: {0}")]
    Persist(#[from] StoreError),

    /// Authority unreachable or rejected the call
    #[error("Failed to communicate with upstream authority for {operation}: {source}")]
    Upstream {
        operation: &'static str,
        #[source]
        source: UpstreamError,
    },
}

impl RelayError {
    /// HTTP status returned to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::NotFound => StatusCode::NOT_FOUND,
            RelayError::InvalidJson(_) | RelayError::MissingFields { .. } => {
                StatusCode::BAD_REQUEST
            }
            RelayError::Persist(_) | RelayError::Upstream { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// JSON body returned to the caller.
    pub fn body(&self) -> Value {
        match self {
            RelayError::NotFound => json!({ "message": "Not Found" }),
            RelayError::InvalidJson(_) => json!({ "message": "Invalid JSON in request body." }),
            RelayError::MissingFields { message } => json!({ "message": message }),
            RelayError::Persist(source) => json!({
                "message": "Failed to record capture payload.",
                "status": "error",
                "error": source.to_string(),
            }),
            RelayError::Upstream { operation, source } => json!({
                "message": format!("Failed to communicate with upstream authority for {operation}."),
                "status": "error",
                "error": source.to_string(),
            }),
        }
    }
}

/// Errors that stop the relay from starting or keep it from serving.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration rejected
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Temp directory could not be prepared
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Authority client could not be constructed
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Listener could not bind
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Server loop ended with an I/O error
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}
