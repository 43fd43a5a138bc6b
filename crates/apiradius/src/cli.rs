//! Clap derive structures for the `apiradius` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// apiradius -- manage RADIUS profiles through a REST API
#[derive(Debug, Parser)]
#[command(
    name = "apiradius",
    version,
    about = "Manage RADIUS profiles through a generic REST API",
    long_about = "Create, read, update and delete RADIUS profiles stored under\n\
        /operator/{operator}/profile on a REST API, with optional OAuth2\n\
        client-credentials authentication and client-side rate limiting.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "APIRADIUS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Base URI of the REST API (overrides config)
    #[arg(long, short = 'u', global = true)]
    pub uri: Option<String>,

    /// Operator whose profiles are managed (overrides config)
    #[arg(long, global = true)]
    pub operator: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "APIRADIUS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (0 = none)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Maximum requests per second
    #[arg(long, global = true)]
    pub rate_limit: Option<f64>,

    /// Log request and response bodies
    #[arg(long, global = true)]
    pub debug: bool,
}

// ── Output Enum ──────────────────────────────────────────────────────

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
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage RADIUS profiles
    #[command(alias = "p")]
    Profile(ProfileArgs),

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Profile ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Create a profile from a JSON or YAML file
    Create {
        /// Profile definition (.json, .yaml or .yml)
        #[arg(long, short = 'f')]
        file: PathBuf,
    },

    /// Show a profile
    Get {
        /// Profile id under the configured operator
        id: String,
    },

    /// Replace a profile with the contents of a file
    Update {
        /// Profile id under the configured operator
        id: String,

        /// Profile definition (.json, .yaml or .yml)
        #[arg(long, short = 'f')]
        file: PathBuf,
    },

    /// Delete a profile (succeeds if it is already gone)
    #[command(alias = "rm")]
    Delete {
        /// Profile id under the configured operator
        id: String,
    },

    /// Print whether a profile exists
    Exists {
        /// Profile id under the configured operator
        id: String,
    },

    /// Show an existing profile by its composite id
    Import {
        /// Composite id: operator/profile
        address: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Show the effective configuration (secrets redacted)
    Show,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
