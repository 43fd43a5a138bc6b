// ── Core error types ──
//
// Errors surfaced to whatever drives the reconcilers. The taxonomy is
// deliberately small: validation, transport, auth, API rejection and
// not-found. "Absent" is never an error here; reads return `None` for it.
// The `From<apiradius_api::Error>` impl translates transport-layer errors.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local ────────────────────────────────────────────────────────
    /// Malformed configuration or resource fields, caught before any request.
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Transport ────────────────────────────────────────────────────
    #[error("Request to {url} failed: {reason}")]
    Transport {
        url: String,
        reason: String,
        /// The configured timeout elapsed.
        timed_out: bool,
    },

    // ── Auth ─────────────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── API ──────────────────────────────────────────────────────────
    /// Non-success response; status and raw body kept for diagnosis.
    #[error("API rejected request (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Unexpected response: {message}")]
    InvalidResponse { message: String, body: String },
}

impl CoreError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<apiradius_api::Error> for CoreError {
    fn from(err: apiradius_api::Error) -> Self {
        match err {
            apiradius_api::Error::Validation { field, reason } => {
                CoreError::Validation { field, reason }
            }
            apiradius_api::Error::Transport(e) => CoreError::Transport {
                url: e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                reason: e.to_string(),
                timed_out: e.is_timeout(),
            },
            apiradius_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            apiradius_api::Error::Tls(reason) => CoreError::Transport {
                url: String::new(),
                reason,
                timed_out: false,
            },
            apiradius_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            apiradius_api::Error::Api { status, body } => CoreError::Api { status, body },
            apiradius_api::Error::NotFound { message } => CoreError::NotFound {
                entity_type: "object".into(),
                identifier: message,
            },
            apiradius_api::Error::Deserialization { message, body } => {
                CoreError::InvalidResponse { message, body }
            }
        }
    }
}
