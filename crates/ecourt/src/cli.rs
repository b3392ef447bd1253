//! Clap derive structures for the `ecourt` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ecourt -- cause lists, courts and case status from the eCourt backend
#[derive(Debug, Parser)]
#[command(
    name = "ecourt",
    version,
    about = "Look up eCourt cause lists, courts and cases from the command line",
    long_about = "Queries an eCourt lookup backend for the court hierarchy\n\
        (states, districts, complexes, courts), daily cause lists and case\n\
        details by CNR. The backend credential is acquired and cached\n\
        automatically.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "ECOURT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend base URL (overrides profile)
    #[arg(long, short = 'u', env = "ECOURT_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ECOURT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "ECOURT_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "ECOURT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Keep the credential in memory only for this run
    #[arg(long, global = true)]
    pub no_token_cache: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// Cause list docket.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListType {
    Civil,
    Criminal,
}

impl From<ListType> for ecourt_api::CauseListType {
    fn from(t: ListType) -> Self {
        match t {
            ListType::Civil => Self::Civil,
            ListType::Criminal => Self::Criminal,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List states
    States,

    /// List districts of a state
    Districts {
        /// State code
        state: String,
    },

    /// List court complexes of a district
    #[command(alias = "complex")]
    Complexes {
        /// State code
        state: String,
        /// District code
        district: String,
    },

    /// List the courts of a complex
    Courts {
        /// State code
        state: String,
        /// District code
        district: String,
        /// Complex code, or its establishment code list
        complex: String,
    },

    /// Fetch one court's cause list
    #[command(alias = "cl")]
    CauseList(CauseListArgs),

    /// Fetch the cause list of every court in a complex
    #[command(alias = "bulk")]
    BulkCauseList(BulkCauseListArgs),

    /// Show a case by its CNR
    Case {
        /// 16-character Case Number Record
        cnr: String,
    },

    /// Inspect or reset the cached backend credential
    Token(TokenArgs),

    /// Check backend health and credential issuance
    Health,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Cause list ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CauseListArgs {
    /// State code
    #[arg(long)]
    pub state: String,

    /// District code
    #[arg(long)]
    pub district: String,

    /// Court code (the court's group code from `ecourt courts`)
    #[arg(long)]
    pub court_code: String,

    /// Court number
    #[arg(long)]
    pub court_number: String,

    /// Civil or criminal list
    #[arg(long = "type", short = 't', value_enum, default_value = "civil")]
    pub list_type: ListType,

    /// Date as YYYY-MM-DD or DD-MM-YYYY (default: today)
    #[arg(long, short = 'd')]
    pub date: Option<String>,

    /// Court name for the saved document header
    #[arg(long)]
    pub court_name: Option<String>,

    /// Save the list as a standalone HTML document
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct BulkCauseListArgs {
    /// State code
    #[arg(long)]
    pub state: String,

    /// District code
    #[arg(long)]
    pub district: String,

    /// Complex code (from `ecourt complexes`)
    #[arg(long)]
    pub complex: String,

    /// Civil or criminal list
    #[arg(long = "type", short = 't', value_enum, default_value = "civil")]
    pub list_type: ListType,

    /// Date as YYYY-MM-DD or DD-MM-YYYY (default: today)
    #[arg(long, short = 'd')]
    pub date: Option<String>,

    /// Write each listed court's document into this directory
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Pause between courts, in milliseconds (default: profile or 500)
    #[arg(long)]
    pub delay_ms: Option<u64>,
}

// ── Token ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub command: TokenCommand,
}

#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Show whether a credential is cached (masked)
    Show,

    /// Discard the cached credential and acquire a new one
    Refresh,

    /// Forget the cached credential
    Clear,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Display current configuration
    Show,

    /// Print the configuration file and token cache locations
    Path,

    /// Set a configuration value on the active profile
    Set {
        /// Config key (base_url, token_cache, timeout, issuance_timeout,
        /// bulk_delay_ms, ca_cert, insecure)
        key: String,
        /// Value to set
        value: String,
    },

    /// Set the default profile
    SetDefault {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
