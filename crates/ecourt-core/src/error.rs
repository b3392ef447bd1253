// ── Core error types ──
//
// User-facing errors from ecourt-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<ecourt_api::Error>`
// impl translates transport-layer errors into domain variants.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the lookup backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authorization failed: {message}")]
    AuthorizationFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Invalid parameters: {message}")]
    InvalidParameters { message: String },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Request rejected by backend: {message}")]
    Rejected { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Local errors ─────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to write {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<ecourt_api::Error> for CoreError {
    fn from(err: ecourt_api::Error) -> Self {
        match err {
            ecourt_api::Error::AuthorizationExpired { message } => {
                CoreError::AuthorizationFailed { message }
            }
            ecourt_api::Error::IssuanceRejected { status, message } => {
                CoreError::AuthorizationFailed {
                    message: format!("token endpoint refused (HTTP {status}): {message}"),
                }
            }
            ecourt_api::Error::Issuance(inner) => match Self::from_shared(&inner) {
                CoreError::Api { message, status } => CoreError::AuthorizationFailed {
                    message: match status {
                        Some(status) => format!("credential issuance failed (HTTP {status}): {message}"),
                        None => format!("credential issuance failed: {message}"),
                    },
                },
                other => other,
            },
            ecourt_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            ecourt_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ecourt_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            ecourt_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ecourt_api::Error::InvalidParameters { message } => {
                CoreError::InvalidParameters { message }
            }
            ecourt_api::Error::NotFound { path } => CoreError::NotFound { what: path },
            ecourt_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            ecourt_api::Error::Rejected { status, message } => CoreError::Rejected {
                message: if message.is_empty() {
                    format!("status '{status}'")
                } else {
                    message
                },
            },
            ecourt_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

impl CoreError {
    /// Translate an issuance error that is shared between waiters.
    ///
    /// The `Arc` cannot be unwrapped while other waiters hold it, so the
    /// variants that own non-`Clone` data are rebuilt from their text.
    fn from_shared(err: &ecourt_api::Error) -> Self {
        match err {
            ecourt_api::Error::Transport(e) if e.is_timeout() => {
                CoreError::Timeout { timeout_secs: 0 }
            }
            ecourt_api::Error::Transport(e) if e.is_connect() => CoreError::ConnectionFailed {
                url: e
                    .url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| "<unknown>".into()),
                reason: e.to_string(),
            },
            ecourt_api::Error::Timeout { timeout_secs } => CoreError::Timeout {
                timeout_secs: *timeout_secs,
            },
            ecourt_api::Error::IssuanceRejected { status, message } => CoreError::Api {
                message: message.clone(),
                status: Some(*status),
            },
            ecourt_api::Error::Issuance(inner) => Self::from_shared(inner),
            other => CoreError::Api {
                message: other.to_string(),
                status: other.status(),
            },
        }
    }

    /// Whether this is a "no such thing" error rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }
}
