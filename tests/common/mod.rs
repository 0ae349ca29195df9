//! Shared fixtures for relay integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Request, Response};
use serde_json::Value;
use tower::ServiceExt;

use passrelay::Relay;
use passrelay::config::UpstreamPaths;
use passrelay::login_hosts::LoginHosts;
use passrelay::server;
use passrelay::temp_store::TempStore;
use passrelay::upstream::{Authority, UpstreamError, UpstreamReply};

/// How the fake authority answers.
#[derive(Debug, Clone)]
pub enum Script {
    Ok(String),
    Reject(u16, String),
    Down,
}

/// In-process [`Authority`] that records every call.
pub struct RecordingAuthority {
    script: Script,
    calls: Mutex<Vec<(String, Value)>>,
}

impl RecordingAuthority {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn answering(body: &str) -> Arc<Self> {
        Self::new(Script::Ok(body.to_string()))
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Authority for RecordingAuthority {
    async fn post_json(&self, path: &str, payload: &Value) -> Result<UpstreamReply, UpstreamError> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_string(), payload.clone()));

        match &self.script {
            Script::Ok(body) => Ok(UpstreamReply {
                status: 200,
                body: body.clone(),
            }),
            Script::Reject(status, body) => Err(UpstreamError::Rejected {
                status: *status,
                body: body.clone(),
            }),
            Script::Down => Err(UpstreamError::Transport("connection refused".to_string())),
        }
    }
}

/// Relay app wired to `authority`, recording into `temp_dir`.
pub fn relay_app(
    authority: Arc<RecordingAuthority>,
    temp_dir: &Path,
    login_hosts: Option<PathBuf>,
) -> Router {
    let relay = Relay::new(
        authority,
        TempStore::new(temp_dir),
        login_hosts.map(LoginHosts::new),
        UpstreamPaths::default(),
    );
    server::app(Arc::new(relay))
}

pub async fn send(app: &Router, method: &str, path: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Capture files currently in `dir`, sorted. Missing dir counts as empty.
pub fn capture_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}

pub fn read_capture(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
