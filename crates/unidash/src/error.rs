//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use unidash_config::ConfigError;
use unidash_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(unidash::connection_failed),
        help(
            "Check that the controller is running and reachable.\n\
             Self-signed certificates are accepted unless controller.insecure = false."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(unidash::timeout),
        help("Raise controller.timeout or check controller responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(unidash::auth_failed),
        help("Verify controller.username / controller.password (or UNIFI_USER / UNIFI_PASS).")
    )]
    AuthFailed,

    #[error("No controller {field} configured")]
    #[diagnostic(
        code(unidash::no_credentials),
        help("Set controller.{field} in the config file or export UNIFI_{env}.")
    )]
    NoCredentials { field: &'static str, env: &'static str },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Site '{name}' not found")]
    #[diagnostic(
        code(unidash::not_found),
        help("Run: unidash sites  to see available sites")
    )]
    SiteNotFound { name: String },

    #[error("{message}")]
    #[diagnostic(code(unidash::conflict))]
    Conflict { message: String },

    #[error("Access denied for {denied} of {total} address(es)")]
    #[diagnostic(
        code(unidash::access_denied),
        help("Add the address or its network to server.allowlist.")
    )]
    AccessDenied { denied: usize, total: usize },

    // ── API / storage ────────────────────────────────────────────────
    #[error("Controller error: {message}")]
    #[diagnostic(code(unidash::api_error))]
    Api { message: String },

    #[error("Snapshot error: {message}")]
    #[diagnostic(
        code(unidash::snapshot),
        help("Check snapshot.path, or rebuild the snapshot with: unidash sync")
    )]
    Snapshot { message: String },

    // ── Validation / configuration ───────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unidash::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(unidash::config), help("Inspect the effective settings with: unidash config"))]
    Config(Box<figment::Error>),

    #[error("Internal error: {0}")]
    #[diagnostic(code(unidash::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode JSON output: {0}")]
    #[diagnostic(code(unidash::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::SiteNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::AccessDenied { .. } => exit_code::PERMISSION,
            Self::Validation { .. } | Self::Config(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { .. } => Self::AuthFailed,
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::SiteNotFound { name } => Self::SiteNotFound { name },
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Conflict { message } => Self::Conflict { message },
            CoreError::Api { message, .. } => Self::Api { message },
            CoreError::Snapshot(e) => Self::Snapshot {
                message: e.to_string(),
            },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { field, env } => Self::NoCredentials { field, env },
            ConfigError::Serialization(e) => Self::Internal(e.to_string()),
            ConfigError::Figment(e) => Self::Config(e),
        }
    }
}
