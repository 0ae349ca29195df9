//! Relay configuration.
//!
//! Everything the relay needs is collected into a [`RelayConfig`] at
//! startup and handed to the server. [`Args`] is the CLI/env surface that
//! produces it.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use thiserror::Error;

pub const DEFAULT_LISTEN_HOST: &str = "127.0.0.1";
pub const DEFAULT_LISTEN_PORT: u16 = 3002;
pub const DEFAULT_UPSTREAM_HOST: &str = "localhost";
pub const DEFAULT_UPSTREAM_PORT: u16 = 8080;
pub const DEFAULT_AUTH_PATH: &str = "/master-pass";
pub const DEFAULT_ADD_ENTRY_PATH: &str = "/add-entry";
pub const DEFAULT_TEMP_DIR: &str = "temp_data";

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Upstream host is empty
    #[error("Upstream host must not be empty")]
    EmptyUpstreamHost,

    /// Upstream port is zero
    #[error("Upstream port must be > 0")]
    ZeroUpstreamPort,

    /// Upstream path does not start with '/'
    #[error("Upstream path must start with '/': {path}")]
    InvalidUpstreamPath { path: String },

    /// Listen host is empty
    #[error("Listen host must not be empty")]
    EmptyListenHost,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Authority routes the relay forwards to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamPaths {
    /// Master password check and lookup
    pub auth: String,
    /// New credential entry
    pub add_entry: String,
}

impl Default for UpstreamPaths {
    fn default() -> Self {
        Self {
            auth: DEFAULT_AUTH_PATH.to_string(),
            add_entry: DEFAULT_ADD_ENTRY_PATH.to_string(),
        }
    }
}

/// Relay configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Interface the relay binds to
    pub listen_host: String,
    /// Inbound port
    pub listen_port: u16,
    /// Authority host
    pub upstream_host: String,
    /// Authority port
    pub upstream_port: u16,
    /// Authority routes
    pub upstream_paths: UpstreamPaths,
    /// Directory for capture files
    pub temp_dir: PathBuf,
    /// Side document with recently seen login hostnames. `None` disables enrichment.
    pub login_hosts_path: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_host: DEFAULT_LISTEN_HOST.to_string(),
            listen_port: DEFAULT_LISTEN_PORT,
            upstream_host: DEFAULT_UPSTREAM_HOST.to_string(),
            upstream_port: DEFAULT_UPSTREAM_PORT,
            upstream_paths: UpstreamPaths::default(),
            temp_dir: PathBuf::from(DEFAULT_TEMP_DIR),
            login_hosts_path: None,
        }
    }
}

impl RelayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream_host.trim().is_empty() {
            return Err(ConfigError::EmptyUpstreamHost);
        }
        if self.upstream_port == 0 {
            return Err(ConfigError::ZeroUpstreamPort);
        }
        for path in [&self.upstream_paths.auth, &self.upstream_paths.add_entry] {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidUpstreamPath { path: path.clone() });
            }
        }
        if self.listen_host.trim().is_empty() {
            return Err(ConfigError::EmptyListenHost);
        }
        Ok(())
    }

    /// `host:port` the listener binds to. Host names are resolved at bind time.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }

    /// Base URL of the authority, without a trailing slash.
    pub fn upstream_base_url(&self) -> String {
        format!("http://{}:{}", self.upstream_host, self.upstream_port)
    }
}

/// CLI arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "passrelay")]
#[command(about = "Loopback relay between the password manager extension and the password authority")]
pub struct Args {
    /// Interface to bind to
    #[arg(long, env = "PASSRELAY_LISTEN_HOST", default_value = DEFAULT_LISTEN_HOST)]
    pub listen_host: String,

    /// Port to listen on
    #[arg(long, env = "PASSRELAY_LISTEN_PORT", default_value_t = DEFAULT_LISTEN_PORT)]
    pub listen_port: u16,

    /// Password authority host
    #[arg(long, env = "PASSRELAY_UPSTREAM_HOST", default_value = DEFAULT_UPSTREAM_HOST)]
    pub upstream_host: String,

    /// Password authority port
    #[arg(long, env = "PASSRELAY_UPSTREAM_PORT", default_value_t = DEFAULT_UPSTREAM_PORT)]
    pub upstream_port: u16,

    /// Authority route for master password checks
    #[arg(long, env = "PASSRELAY_AUTH_PATH", default_value = DEFAULT_AUTH_PATH)]
    pub auth_path: String,

    /// Authority route for new entries
    #[arg(long, env = "PASSRELAY_ADD_PATH", default_value = DEFAULT_ADD_ENTRY_PATH)]
    pub add_path: String,

    /// Directory for capture files
    #[arg(long, env = "PASSRELAY_TEMP_DIR", default_value = DEFAULT_TEMP_DIR)]
    pub temp_dir: PathBuf,

    /// Login hostname side document (e.g. pages.json). Enrichment is off when unset.
    #[arg(long, env = "PASSRELAY_LOGIN_HOSTS_PATH")]
    pub login_hosts_path: Option<PathBuf>,

    /// Log output format
    #[arg(long, env = "PASSRELAY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl From<Args> for RelayConfig {
    fn from(args: Args) -> Self {
        Self {
            listen_host: args.listen_host,
            listen_port: args.listen_port,
            upstream_host: args.upstream_host,
            upstream_port: args.upstream_port,
            upstream_paths: UpstreamPaths {
                auth: args.auth_path,
                add_entry: args.add_path,
            },
            temp_dir: args.temp_dir,
            login_hosts_path: args.login_hosts_path,
        }
    }
}
