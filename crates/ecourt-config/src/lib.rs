//! Shared configuration for ecourt tools.
//!
//! TOML profiles loaded through figment (defaults, then the config file,
//! then `ECOURT_` environment variables), translation to
//! `ecourt_api::ClientConfig`, and the durable caches that keep the
//! backend credential between runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

use ecourt_api::{
    ClientConfig, DEFAULT_BASE_URL, MemoryTokenCache, TlsMode, TokenCache, TransportConfig,
};

mod cache;

pub use cache::{FileTokenCache, KEYRING_SERVICE, KeyringTokenCache};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("token cache unavailable for profile '{profile}': {reason}")]
    TokenCache { profile: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// The named profile, or a stock profile pointing at the default
    /// backend when the name is not configured.
    pub fn profile_or_default(&self, name: &str) -> Profile {
        self.profiles.get(name).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Bound on one credential issuance call, in seconds.
    #[serde(default = "default_timeout")]
    pub issuance_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            issuance_timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

/// Where a profile keeps its credential between runs.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TokenCacheKind {
    /// A JSON file in the platform data directory.
    #[default]
    File,
    /// The system keyring.
    Keyring,
    /// Nowhere: every run acquires a fresh credential.
    Memory,
}

/// A named backend profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "http://localhost:8000").
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub token_cache: TokenCacheKind,

    /// Override request timeout.
    pub timeout: Option<u64>,

    /// Override issuance timeout.
    pub issuance_timeout: Option<u64>,

    /// Pause between courts in a bulk cause-list run.
    pub bulk_delay_ms: Option<u64>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid TLS certificates.
    pub insecure: Option<bool>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_cache: TokenCacheKind::default(),
            timeout: None,
            issuance_timeout: None,
            bulk_delay_ms: None,
            ca_cert: None,
            insecure: None,
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "ecourt", "ecourt")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "ecourt", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding file-cached credentials, one file per profile.
pub fn token_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".local", "share", "ecourt", "tokens"]),
        |dirs| dirs.data_dir().join("tokens"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` + environment. A missing file is not an error.
///
/// Environment keys nest on a double underscore, so
/// `ECOURT_DEFAULTS__OUTPUT=json` sets `defaults.output`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ECOURT_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ClientConfig` from a profile, falling back to `defaults`
/// for anything the profile leaves unset.
pub fn profile_to_client_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let base_url: url::Url = profile
        .base_url
        .parse()
        .map_err(|e| ConfigError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL '{}': {e}", profile.base_url),
        })?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    Ok(ClientConfig {
        base_url,
        transport: TransportConfig {
            tls,
            timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        },
        issuance_timeout: Duration::from_secs(
            profile.issuance_timeout.unwrap_or(defaults.issuance_timeout),
        ),
    })
}

/// The durable credential cache a profile asks for.
pub fn token_cache_for(
    profile: &Profile,
    profile_name: &str,
) -> Result<Arc<dyn TokenCache>, ConfigError> {
    Ok(match profile.token_cache {
        TokenCacheKind::File => Arc::new(FileTokenCache::for_profile(profile_name)),
        TokenCacheKind::Keyring => {
            let cache =
                KeyringTokenCache::new(profile_name).map_err(|e| ConfigError::TokenCache {
                    profile: profile_name.into(),
                    reason: e.message,
                })?;
            Arc::new(cache)
        }
        TokenCacheKind::Memory => Arc::new(MemoryTokenCache::new()),
    })
}
