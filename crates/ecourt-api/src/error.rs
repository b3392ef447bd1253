use std::sync::Arc;

use thiserror::Error;

/// Top-level error type for the `ecourt-api` crate.
///
/// Covers every failure mode of the session layer and the typed call
/// surface: transport, credential issuance, authorization, and the
/// backend's status codes. `ecourt-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authorization ───────────────────────────────────────────────
    /// The backend rejected the request with 401 even after one
    /// credential refresh and resend.
    #[error("Authorization expired: {message}")]
    AuthorizationExpired { message: String },

    /// A shared credential acquisition failed. Every caller waiting on
    /// that acquisition receives the same underlying error.
    #[error("Credential issuance failed: {0}")]
    Issuance(#[source] Arc<Error>),

    /// The issuance endpoint answered, but not with a usable token.
    #[error("Token endpoint rejected the request (HTTP {status}): {message}")]
    IssuanceRejected { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend statuses ────────────────────────────────────────────
    /// HTTP 400: the backend refused the parameters.
    #[error("Invalid parameters (HTTP 400): {message}")]
    InvalidParameters { message: String },

    /// HTTP 404 on an endpoint where "no result" is not a valid answer.
    #[error("Not found (HTTP 404): {path}")]
    NotFound { path: String },

    /// Any other non-success HTTP status.
    #[error("Backend error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP 200 with an envelope whose `status` is not `"success"`.
    #[error("Backend reported status '{status}': {message}")]
    Rejected { status: String, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// The backend HTTP status behind this error, if there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthorizationExpired { .. } => Some(401),
            Self::InvalidParameters { .. } => Some(400),
            Self::NotFound { .. } => Some(404),
            Self::Api { status, .. } | Self::IssuanceRejected { status, .. } => Some(*status),
            Self::Issuance(inner) => inner.status(),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the credential was refused and a fresh run of
    /// the client (or a `token refresh`) might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            Self::AuthorizationExpired { .. } => true,
            Self::Issuance(inner) => inner.is_auth_expired(),
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying by hand.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Issuance(inner) => inner.is_transient(),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
