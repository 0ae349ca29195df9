#![no_main]

//! Fuzz target for inbound request handling.
//!
//! Arbitrary method selector, path and body go through `Relay::dispatch`
//! with an authority that answers with fuzzer-chosen bytes.
//!
//! # Goal
//! Verify that malformed bodies and upstream answers do not cause:
//! - Panics
//! - Replies outside 200/204/400/404/500
//! - Upstream calls for requests that failed validation

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use arbitrary::Arbitrary;
use async_trait::async_trait;
use http::{Method, StatusCode};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

use passrelay::Relay;
use passrelay::config::UpstreamPaths;
use passrelay::temp_store::TempStore;
use passrelay::upstream::{Authority, UpstreamError, UpstreamReply};

#[derive(Debug, Arbitrary)]
struct Input {
    method: u8,
    path: u8,
    body: Vec<u8>,
    upstream_body: String,
    upstream_fails: bool,
}

struct ScriptedAuthority {
    body: String,
    fails: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl Authority for ScriptedAuthority {
    async fn post_json(&self, _path: &str, _payload: &Value) -> Result<UpstreamReply, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fails {
            Err(UpstreamError::Transport("fuzz".to_string()))
        } else {
            Ok(UpstreamReply { status: 200, body: self.body.clone() })
        }
    }
}

fuzz_target!(|input: Input| {
    let method = match input.method % 3 {
        0 => Method::POST,
        1 => Method::OPTIONS,
        _ => Method::GET,
    };
    let path = match input.path % 4 {
        0 => "/log-data",
        1 => "/add-password-entry",
        2 => "/capture-website-login",
        _ => "/other",
    };

    // Removed on drop at the end of the iteration.
    let Ok(dir) = tempfile::tempdir() else {
        return;
    };
    let authority = Arc::new(ScriptedAuthority {
        body: input.upstream_body,
        fails: input.upstream_fails,
        calls: AtomicUsize::new(0),
    });
    let relay = Relay::new(authority.clone(), TempStore::new(dir.path()), None, UpstreamPaths::default());

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(_) => return,
    };
    let reply = runtime.block_on(relay.dispatch(&method, path, &input.body));

    assert!(matches!(
        reply.status,
        StatusCode::OK
            | StatusCode::NO_CONTENT
            | StatusCode::BAD_REQUEST
            | StatusCode::NOT_FOUND
            | StatusCode::INTERNAL_SERVER_ERROR
    ));
    if reply.status == StatusCode::BAD_REQUEST || reply.status == StatusCode::NOT_FOUND {
        assert_eq!(authority.calls.load(Ordering::SeqCst), 0);
    }
});
