//! Inbound route table.
//!
//! Each [`Route`] variant carries the rules the router applies to it:
//! which fields must be present, whether the payload is recorded and
//! enriched, and where (if anywhere) it is forwarded.
//!
//! | Route | Required | Upstream | Record | Enrich |
//! |---|---|---|---|---|
//! | `POST /log-data` | `hostname` + (`password` or `isLoginPage`) | auth path | yes | yes |
//! | `POST /add-password-entry` | `masterPassword`, `appName`, `newPassword` | add path | no | no |
//! | `POST /capture-website-login` | none | none | yes | no |

use http::Method;
use serde_json::Value;

use crate::capture::{has_all, has_any};
use crate::config::UpstreamPaths;

/// Routes the relay serves. Anything else is a 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Master password check and credential lookup.
    LogData,
    /// Store a new credential entry.
    AddPasswordEntry,
    /// Credentials seen on a website. Recorded and echoed, not forwarded.
    CaptureWebsiteLogin,
}

impl Route {
    pub const ALL: [Route; 3] = [
        Route::LogData,
        Route::AddPasswordEntry,
        Route::CaptureWebsiteLogin,
    ];

    /// Match an inbound method and path. Paths match exactly.
    pub fn resolve(method: &Method, path: &str) -> Option<Route> {
        if *method != Method::POST {
            return None;
        }
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::LogData => "/log-data",
            Route::AddPasswordEntry => "/add-password-entry",
            Route::CaptureWebsiteLogin => "/capture-website-login",
        }
    }

    /// Label used in logs and in upstream failure messages.
    pub fn operation(self) -> &'static str {
        match self {
            Route::LogData => "Authentication/Search",
            Route::AddPasswordEntry => "Add Password Entry",
            Route::CaptureWebsiteLogin => "Capture Website Login",
        }
    }

    /// Presence check for the route's required fields.
    pub fn validate(self, payload: &Value) -> bool {
        match self {
            Route::LogData => {
                has_all(payload, &["hostname"]) && has_any(payload, &["password", "isLoginPage"])
            }
            Route::AddPasswordEntry => {
                has_all(payload, &["masterPassword", "appName", "newPassword"])
            }
            Route::CaptureWebsiteLogin => true,
        }
    }

    /// 400 message when [`Route::validate`] fails.
    pub fn missing_fields_message(self) -> &'static str {
        match self {
            Route::LogData => "Invalid request body. Missing hostname or password.",
            Route::AddPasswordEntry => {
                "Invalid request body for adding password. Missing masterPassword, appName, or newPassword."
            }
            Route::CaptureWebsiteLogin => "Invalid request body.",
        }
    }

    /// Returns `true` if the payload is written to the temp store.
    pub fn records(self) -> bool {
        matches!(self, Route::LogData | Route::CaptureWebsiteLogin)
    }

    /// Returns `true` if the payload gets `loginPageHostname` attached.
    pub fn enriches(self) -> bool {
        matches!(self, Route::LogData)
    }

    /// Upstream path this route forwards to, if it forwards at all.
    pub fn upstream_path(self, paths: &UpstreamPaths) -> Option<&str> {
        match self {
            Route::LogData => Some(paths.auth.as_str()),
            Route::AddPasswordEntry => Some(paths.add_entry.as_str()),
            Route::CaptureWebsiteLogin => None,
        }
    }

    /// Returns `true` if this route calls the authority.
    pub fn forwards(self) -> bool {
        !matches!(self, Route::CaptureWebsiteLogin)
    }
}
