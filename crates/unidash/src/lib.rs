//! The unidash dashboard server.
//!
//! An axum application in front of a UniFi controller: allowlist-gated
//! JSON endpoints for board revisions, sites and VLAN provisioning, the
//! fan-out MAC search streamed as NDJSON, and the static dashboard page.
//! The `unidash` binary wraps it in a CLI.

pub mod server;

pub use server::{AppState, router, serve};
