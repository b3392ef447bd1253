//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use ecourt_config::ConfigError;
use ecourt_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the lookup backend at {url}")]
    #[diagnostic(
        code(ecourt::connection_failed),
        help(
            "Check that the backend is running and accessible.\n\
             Try: ecourt health --base-url <URL>"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {reason}")]
    #[diagnostic(
        code(ecourt::tls_error),
        help(
            "Use --insecure (-k) to accept a self-signed certificate,\n\
             or configure ca_cert in your profile."
        )
    )]
    TlsError { reason: String },

    // ── Authorization ────────────────────────────────────────────────

    #[error("The backend refused the credential: {message}")]
    #[diagnostic(
        code(ecourt::auth_failed),
        help(
            "A fresh credential was requested and still refused.\n\
             Try: ecourt token clear, then retry."
        )
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(ecourt::not_found), help("{hint}"))]
    NotFound {
        resource_type: String,
        identifier: String,
        hint: String,
    },

    // ── Backend ──────────────────────────────────────────────────────

    #[error("The backend rejected the parameters: {message}")]
    #[diagnostic(
        code(ecourt::invalid_parameters),
        help("Check the codes against `ecourt states`, `districts`, `complexes` and `courts`.")
    )]
    InvalidParameters { message: String },

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(ecourt::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ecourt::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ecourt::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: ecourt config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(ecourt::config))]
    Config(Box<figment::Error>),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(ecourt::config))]
    ConfigFile(ConfigError),

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(ecourt::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error("Could not write {path}")]
    #[diagnostic(code(ecourt::export))]
    Export {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Figment(err) => Self::Config(err),
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::ConfigFile(other),
        }
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::InvalidParameters { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                if let Some(tls) = reason.strip_prefix("TLS error: ") {
                    CliError::TlsError {
                        reason: tls.to_owned(),
                    }
                } else {
                    CliError::ConnectionFailed {
                        url,
                        source: reason.into(),
                    }
                }
            }

            CoreError::AuthorizationFailed { message } => CliError::AuthFailed { message },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::InvalidParameters { message } => CliError::InvalidParameters { message },

            CoreError::NotFound { what } => CliError::NotFound {
                resource_type: "resource".into(),
                identifier: what,
                hint: "The backend has no such resource; check the codes you passed.".into(),
            },

            CoreError::Rejected { message } => CliError::ApiError {
                code: "rejected".into(),
                message,
            },

            CoreError::Api { message, status } => CliError::ApiError {
                code: status.map_or_else(|| "api".into(), |s| format!("HTTP {s}")),
                message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },

            CoreError::Export { path, source } => CliError::Export {
                path: path.display().to_string(),
                source,
            },

            CoreError::Internal(message) => CliError::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

impl From<ecourt_api::Error> for CliError {
    fn from(err: ecourt_api::Error) -> Self {
        CoreError::from(err).into()
    }
}
