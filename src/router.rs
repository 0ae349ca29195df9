//! Request handling for the relay.
//!
//! [`Relay::dispatch`] takes one fully buffered inbound request and runs it
//! through the [`Route`] table:
//!
//! 1. parse the body as JSON (400)
//! 2. resolve the route (404 if none)
//! 3. presence-check required fields (400)
//! 4. attach `loginPageHostname` if the route enriches and a side document is configured
//! 5. record the payload if the route records (500 on I/O failure)
//! 6. forward to the authority if the route forwards (500 on failure)
//!
//! A request that fails a step never reaches the next one.

use std::sync::Arc;

use http::{Method, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use crate::capture::LOGIN_PAGE_HOSTNAME;
use crate::config::UpstreamPaths;
use crate::error::RelayError;
use crate::login_hosts::LoginHosts;
use crate::route::Route;
use crate::temp_store::TempStore;
use crate::upstream::{Authority, UpstreamReply};

/// Status and JSON body to send back. `body: None` means an empty body.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayReply {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl RelayReply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: Some(body),
        }
    }

    /// CORS preflight answer.
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: None,
        }
    }
}

impl From<RelayError> for RelayReply {
    fn from(err: RelayError) -> Self {
        Self {
            status: err.status_code(),
            body: Some(err.body()),
        }
    }
}

/// Shared request handler. Read-only after construction.
pub struct Relay {
    authority: Arc<dyn Authority>,
    store: TempStore,
    login_hosts: Option<LoginHosts>,
    paths: UpstreamPaths,
}

impl Relay {
    pub fn new(
        authority: Arc<dyn Authority>,
        store: TempStore,
        login_hosts: Option<LoginHosts>,
        paths: UpstreamPaths,
    ) -> Self {
        Self {
            authority,
            store,
            login_hosts,
            paths,
        }
    }

    pub fn store(&self) -> &TempStore {
        &self.store
    }

    /// Handle one request. Never fails; errors become error replies.
    pub async fn dispatch(&self, method: &Method, path: &str, body: &[u8]) -> RelayReply {
        if *method == Method::OPTIONS {
            return RelayReply::no_content();
        }

        let payload: Value = match serde_json::from_slice(body) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(%method, path, error = %e, "Invalid JSON in request body");
                return RelayError::from(e).into();
            }
        };

        let Some(route) = Route::resolve(method, path) else {
            debug!(%method, path, "No route");
            return RelayError::NotFound.into();
        };

        match self.handle(route, payload).await {
            Ok(reply) => {
                info!(route = route.path(), status = reply.status.as_u16(), "Request handled");
                reply
            }
            Err(err) => {
                let reply = RelayReply::from(err);
                warn!(route = route.path(), status = reply.status.as_u16(), "Request failed");
                reply
            }
        }
    }

    async fn handle(&self, route: Route, mut payload: Value) -> Result<RelayReply, RelayError> {
        if !route.validate(&payload) {
            warn!(route = route.path(), "Missing required fields");
            return Err(RelayError::MissingFields {
                message: route.missing_fields_message(),
            });
        }

        if route.enriches() {
            self.enrich(&mut payload).await;
        }

        if route.records() {
            self.store.record(&payload).await?;
        }

        let Some(upstream_path) = route.upstream_path(&self.paths) else {
            return Ok(RelayReply::ok(json!({
                "status": "success",
                "message": "Website login data received by relay.",
                "receivedData": payload,
            })));
        };

        debug!(route = route.path(), upstream_path, "Forwarding to authority");
        let reply = self
            .authority
            .post_json(upstream_path, &payload)
            .await
            .map_err(|source| {
                error!(operation = route.operation(), error = %source, "Upstream call failed");
                RelayError::Upstream {
                    operation: route.operation(),
                    source,
                }
            })?;

        Ok(RelayReply::ok(pass_through(route, &reply)))
    }

    async fn enrich(&self, payload: &mut Value) {
        let Some(login_hosts) = &self.login_hosts else {
            return;
        };
        let Some(hostname) = login_hosts.most_recent().await else {
            debug!("No login hostname to attach");
            return;
        };
        if let Some(obj) = payload.as_object_mut() {
            debug!(%hostname, "Attaching login page hostname");
            obj.insert(LOGIN_PAGE_HOSTNAME.to_string(), Value::String(hostname));
        }
    }
}

/// The authority's body as-is, or a generic error if it is not JSON.
fn pass_through(route: Route, reply: &UpstreamReply) -> Value {
    match serde_json::from_str(&reply.body) {
        Ok(body) => body,
        Err(e) => {
            error!(operation = route.operation(), error = %e, "Authority returned non-JSON body");
            json!({
                "status": "error",
                "message": format!("Error parsing upstream response for {}.", route.operation()),
            })
        }
    }
}
