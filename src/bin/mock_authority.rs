//! Stand-in password authority for local development.
//!
//! Serves `/master-pass` and `/add-entry` on port 8080 with an in-memory
//! vault. The master password comes from `MOCK_MASTER_PASSWORD`.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use passrelay::capture::{AddEntryPayload, CapturePayload, UpstreamResponse, UpstreamStatus};

struct Vault {
    master_password: String,
    entries: Mutex<HashMap<String, String>>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let vault = Arc::new(Vault {
        master_password: std::env::var("MOCK_MASTER_PASSWORD")
            .unwrap_or_else(|_| "secret".to_string()),
        entries: Mutex::new(HashMap::new()),
    });

    let app = Router::new()
        .route("/master-pass", post(master_pass))
        .route("/add-entry", post(add_entry))
        .with_state(vault);

    let addr = SocketAddr::from(([127, 0, 0, 1], 8080));
    tracing::info!("Mock password authority listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        tracing::error!("Failed to bind to {}: {}", addr, e);
        e
    })?;

    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        e
    })?;

    Ok(())
}

fn reply(
    code: StatusCode,
    status: UpstreamStatus,
    message: String,
    password: Option<String>,
) -> (StatusCode, Json<Value>) {
    let body = UpstreamResponse {
        status,
        message,
        password,
    };
    (code, Json(serde_json::to_value(body).unwrap_or_else(|_| json!({}))))
}

async fn master_pass(
    State(vault): State<Arc<Vault>>,
    Json(payload): Json<CapturePayload>,
) -> (StatusCode, Json<Value>) {
    tracing::info!(hostname = %payload.hostname, "Master password check");

    if payload.password.as_deref() != Some(vault.master_password.as_str()) {
        return reply(
            StatusCode::UNAUTHORIZED,
            UpstreamStatus::Failure,
            "Authentication failed: Incorrect master password".to_string(),
            None,
        );
    }

    let entries = match vault.entries.lock() {
        Ok(entries) => entries,
        Err(poisoned) => poisoned.into_inner(),
    };
    let found = entries
        .iter()
        .find(|(app_name, _)| app_name.contains(&payload.hostname))
        .map(|(_, password)| password.clone());

    match found {
        Some(password) => reply(
            StatusCode::OK,
            UpstreamStatus::Success,
            format!("Password found for {}", payload.hostname),
            Some(password),
        ),
        None => reply(
            StatusCode::OK,
            UpstreamStatus::Success,
            format!("No password found for application: {}", payload.hostname),
            None,
        ),
    }
}

async fn add_entry(
    State(vault): State<Arc<Vault>>,
    Json(payload): Json<AddEntryPayload>,
) -> (StatusCode, Json<Value>) {
    tracing::info!(app = %payload.app_name, "Add entry");

    if payload.master_password != vault.master_password {
        return reply(
            StatusCode::UNAUTHORIZED,
            UpstreamStatus::Failure,
            "Authentication failed: Incorrect master password".to_string(),
            None,
        );
    }

    let mut entries = match vault.entries.lock() {
        Ok(entries) => entries,
        Err(poisoned) => poisoned.into_inner(),
    };
    entries.insert(payload.app_name.clone(), payload.new_password);

    reply(
        StatusCode::OK,
        UpstreamStatus::Success,
        format!("Added password for '{}'", payload.app_name),
        None,
    )
}
