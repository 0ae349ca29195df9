//! HTTP listener.
//!
//! A single axum fallback handler buffers the body and hands the request to
//! [`Relay::dispatch`]. A response layer stamps the permissive CORS headers
//! on everything, error replies and preflights included.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::middleware;
use axum::response::{IntoResponse, Json, Response};
use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use http::{HeaderValue, Method, Uri};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::config::RelayConfig;
use crate::error::StartupError;
use crate::login_hosts::LoginHosts;
use crate::router::{Relay, RelayReply};
use crate::temp_store::TempStore;
use crate::upstream::HttpAuthority;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "POST, GET, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

impl IntoResponse for RelayReply {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        }
    }
}

/// Build the axum application around `relay`.
///
/// Bodies are buffered whole with no size cap.
pub fn app(relay: Arc<Relay>) -> Router {
    Router::new()
        .fallback(handle)
        .with_state(relay)
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::map_response(apply_cors))
}

async fn handle(
    State(relay): State<Arc<Relay>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    debug!(%method, path = uri.path(), bytes = body.len(), "Received request");
    relay.dispatch(&method, uri.path(), &body).await.into_response()
}

async fn apply_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ALLOW_ORIGIN));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    response
}

/// Wire a [`Relay`] to the real authority, temp store and side document.
pub async fn build_relay(config: &RelayConfig) -> Result<Relay, StartupError> {
    config.validate()?;

    let store = TempStore::new(&config.temp_dir);
    store.ensure_dir().await?;

    let authority = HttpAuthority::new(&config.upstream_host, config.upstream_port)?;
    let login_hosts = config.login_hosts_path.as_ref().map(LoginHosts::new);

    Ok(Relay::new(
        Arc::new(authority),
        store,
        login_hosts,
        config.upstream_paths.clone(),
    ))
}

/// Serve `relay` on an already bound listener until `shutdown` resolves.
pub async fn serve_on<F>(
    listener: TcpListener,
    relay: Arc<Relay>,
    shutdown: F,
) -> Result<(), StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(relay))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| {
            error!(error = %e, "Server error");
            StartupError::Serve(e)
        })
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn run(config: RelayConfig) -> Result<(), StartupError> {
    let relay = build_relay(&config).await?;
    let address = config.listen_addr();

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| {
            error!(%address, error = %source, "Failed to bind");
            StartupError::Bind {
                address: address.clone(),
                source,
            }
        })?;

    info!(%address, "passrelay listening");
    info!(
        auth = %format!("{}{}", config.upstream_base_url(), config.upstream_paths.auth),
        add_entry = %format!("{}{}", config.upstream_base_url(), config.upstream_paths.add_entry),
        temp_dir = %config.temp_dir.display(),
        "Forwarding to password authority"
    );

    serve_on(listener, Arc::new(relay), shutdown_signal()).await?;
    info!("passrelay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
        // Without a signal handler, serve until the process is killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
