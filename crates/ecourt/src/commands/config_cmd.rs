//! Config subcommand handlers.

use dialoguer::{Input, Select};
use serde::Serialize;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile, TokenCacheKind};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse_value<T: std::str::FromStr>(
    key: &str,
    value: &str,
    expected: &str,
) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: format!("must be {expected}"),
    })
}

/// Apply `key = value` to `profile`.
fn set_profile_value(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "base_url" | "base-url" => {
            url::Url::parse(&value).map_err(|e| CliError::Validation {
                field: "base_url".into(),
                reason: format!("invalid URL '{value}': {e}"),
            })?;
            profile.base_url = value;
        }
        "token_cache" | "token-cache" => {
            profile.token_cache = parse_value(key, &value, "'file', 'keyring' or 'memory'")?;
        }
        "timeout" => profile.timeout = Some(parse_value(key, &value, "a number (seconds)")?),
        "issuance_timeout" | "issuance-timeout" => {
            profile.issuance_timeout = Some(parse_value(key, &value, "a number (seconds)")?);
        }
        "bulk_delay_ms" | "bulk-delay-ms" => {
            profile.bulk_delay_ms = Some(parse_value(key, &value, "a number (milliseconds)")?);
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "insecure" => profile.insecure = Some(parse_value(key, &value, "'true' or 'false'")?),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: base_url, token_cache, \
                     timeout, issuance_timeout, bulk_delay_ms, ca_cert, insecure"
                ),
            });
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct Paths {
    config: String,
    tokens: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("eCourt CLI configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let base_url: String = Input::new()
                .with_prompt("Backend URL")
                .default(ecourt_api::DEFAULT_BASE_URL.into())
                .interact_text()
                .map_err(prompt_err)?;

            let cache_choices = &[
                "File in the data directory (recommended)",
                "System keyring",
                "Memory only (new credential every run)",
            ];
            let token_cache = match Select::new()
                .with_prompt("Where to keep the backend credential?")
                .items(cache_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?
            {
                0 => TokenCacheKind::File,
                1 => TokenCacheKind::Keyring,
                _ => TokenCacheKind::Memory,
            };

            let mut profile = Profile {
                token_cache,
                ..Profile::default()
            };
            set_profile_value(&mut profile, "base_url", base_url)?;

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: ecourt health");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(
                &global.output,
                &cfg,
                |c: &Config| {
                    toml::to_string_pretty(c).unwrap_or_else(|e| format!("{c:#?}\n({e})"))
                },
                |c| c.default_profile.clone().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            let paths = Paths {
                config: config::config_path().display().to_string(),
                tokens: config::token_dir().display().to_string(),
            };
            let out = output::render_single(
                &global.output,
                &paths,
                |p| format!("Config: {}\nTokens: {}", p.config, p.tokens),
                |p| p.config.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_profile_value(profile, &key, value)?;

            config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── SetDefault <name> ───────────────────────────────────────
        ConfigCommand::SetDefault { name } => {
            let mut cfg = config::load_config()?;

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }
    }
}
