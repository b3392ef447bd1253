//! CLI configuration: a thin wrapper around `ecourt_config`.
//!
//! Re-exports the shared types and applies `GlobalOpts` flag overrides
//! (--base-url, --insecure, --timeout, --no-token-cache) on top of the
//! selected profile.

use std::sync::Arc;

use ecourt_api::{ClientConfig, TokenCache};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use ecourt_config::{
    Config, Profile, TokenCacheKind, config_path, load_config, load_config_or_default,
    save_config, token_dir,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names for error help text.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// The active profile with flag overrides applied.
///
/// An explicitly requested profile must exist; the implicit default
/// falls back to a stock profile.
pub fn resolve_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    if global.profile.is_some() && !config.profiles.contains_key(&name) {
        return Err(CliError::ProfileNotFound {
            available: available_profiles(config),
            name,
        });
    }

    let mut profile = config.profile_or_default(&name);
    if let Some(ref url) = global.base_url {
        profile.base_url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(secs) = global.timeout {
        profile.timeout = Some(secs);
    }
    if global.no_token_cache {
        profile.token_cache = TokenCacheKind::Memory;
    }
    Ok((name, profile))
}

/// Client settings and credential cache for a resolved profile.
pub fn client_parts(
    profile: &Profile,
    profile_name: &str,
    config: &Config,
) -> Result<(ClientConfig, Arc<dyn TokenCache>), CliError> {
    let client_config = ecourt_config::profile_to_client_config(profile, &config.defaults)?;
    let cache = ecourt_config::token_cache_for(profile, profile_name)?;
    Ok((client_config, cache))
}
