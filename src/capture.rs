//! Wire payloads exchanged with the extension and the authority.
//!
//! The relay itself routes on raw [`serde_json::Value`] objects so that
//! fields it does not know about survive forwarding and echoing. The typed
//! structs here describe the shapes the producer and consumer agree on.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key the relay adds to a capture payload during enrichment.
pub const LOGIN_PAGE_HOSTNAME: &str = "loginPageHostname";

/// Where in the extension a capture payload originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureSource {
    /// Master password typed into the extension popup.
    Popup,
    /// Password field changed on a website.
    WebsiteInputChange,
    /// Login form submitted on a website.
    WebsiteFormSubmit,
}

/// Login-page event emitted by the extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturePayload {
    pub hostname: String,
    #[serde(default)]
    pub is_login_page: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<CaptureSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_page_hostname: Option<String>,
}

/// New credential entry for the authority to store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEntryPayload {
    pub master_password: String,
    pub app_name: String,
    pub new_password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Outcome reported by the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamStatus {
    Success,
    Error,
    /// Wrong master password.
    Failure,
}

/// Body the authority answers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamResponse {
    pub status: UpstreamStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Presence check: `true` when `key` exists on the payload object.
///
/// Any value counts, including `null` and the empty string. Non-object
/// payloads have no fields.
pub fn has_field(payload: &Value, key: &str) -> bool {
    payload.as_object().is_some_and(|obj| obj.contains_key(key))
}

/// Returns `true` when every key in `keys` is present.
pub fn has_all(payload: &Value, keys: &[&str]) -> bool {
    keys.iter().all(|key| has_field(payload, key))
}

/// Returns `true` when at least one key in `keys` is present.
pub fn has_any(payload: &Value, keys: &[&str]) -> bool {
    keys.iter().any(|key| has_field(payload, key))
}
