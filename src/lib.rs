//! passrelay - Loopback relay between the password manager extension and
//! the upstream password authority.
//!
//! The extension talks to the relay on a local port. The relay checks
//! the request shape, records capture payloads on disk and forwards
//! authentication and add-entry requests to the authority.
//!
//! # Request Flow
//!
//! ```text
//! extension --POST /log-data-------------> relay --POST /master-pass--> authority
//! extension --POST /add-password-entry---> relay --POST /add-entry----> authority
//! extension --POST /capture-website-login> relay (record + echo, no forwarding)
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod logging;
pub mod login_hosts;
pub mod route;
pub mod router;
pub mod server;
pub mod temp_store;
pub mod upstream;

pub use config::RelayConfig;
pub use error::RelayError;
pub use router::{Relay, RelayReply};
