// ── Core error types ──
//
// Domain errors from unidash-core. Consumers never see HTTP status codes or
// JSON parse failures of the controller directly; the
// `From<unidash_api::Error>` impl translates transport-layer errors into
// domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Site not found: {name}")]
    SiteNotFound { name: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Already exists: {message}")]
    Conflict { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Local storage ────────────────────────────────────────────────
    #[error("Snapshot store error: {0}")]
    Snapshot(#[from] rusqlite::Error),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

impl From<crate::model::MacParseError> for CoreError {
    fn from(err: crate::model::MacParseError) -> Self {
        Self::validation(err.to_string())
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<unidash_api::Error> for CoreError {
    fn from(err: unidash_api::Error) -> Self {
        match err {
            unidash_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            unidash_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e.url().map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            unidash_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            unidash_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            unidash_api::Error::LegacyApi { message, status } => {
                CoreError::Api { message, status }
            }
            unidash_api::Error::Deserialization { message, body: _ } => {
                CoreError::Api {
                    message: format!("malformed controller payload: {message}"),
                    status: None,
                }
            }
        }
    }
}
