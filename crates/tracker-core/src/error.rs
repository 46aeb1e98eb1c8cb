// ── Core error types ──
//
// User-facing errors from tracker-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<tracker_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Cannot reach the Data Tracker service: {reason}")]
    ServiceUnreachable { reason: String },

    #[error("Not logged in: {message}")]
    NotLoggedIn { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entry not found: {kind} {identifier}")]
    EntryNotFound { kind: String, identifier: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] crate::validate::ValidationError),

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<tracker_api::Error> for CoreError {
    fn from(err: tracker_api::Error) -> Self {
        match err {
            tracker_api::Error::Authentication { message } => CoreError::NotLoggedIn { message },
            tracker_api::Error::PermissionDenied { message } => {
                CoreError::PermissionDenied { message }
            }
            tracker_api::Error::Transport(ref e) => {
                if e.is_timeout() || e.is_connect() {
                    CoreError::ServiceUnreachable {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            tracker_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            tracker_api::Error::Tls(msg) => CoreError::ServiceUnreachable {
                reason: format!("TLS error: {msg}"),
            },
            tracker_api::Error::NotFound { path } => CoreError::EntryNotFound {
                kind: "resource".into(),
                identifier: path,
            },
            tracker_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            tracker_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
