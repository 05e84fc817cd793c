//! Clap derive structures for the `triplex` CLI.
//!
//! Defines the command tree, global flags and shared value enums. Also
//! compiled by `build.rs` for man pages, so it may only use clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// triplex -- one data source over Prometheus, Loki and JSON REST APIs
#[derive(Debug, Parser)]
#[command(
    name = "triplex",
    version,
    about = "Query Prometheus, Loki and JSON REST APIs as one uniform data source",
    long_about = "Dispatches metrics, log and REST queries to their backends and\n\
        normalizes every answer into the same frame model: named, typed\n\
        columns with optional labels.",
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
    /// Config profile to use
    #[arg(long, short = 'p', env = "TRIPLEX_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Prometheus-compatible metrics URL (overrides profile)
    #[arg(long, env = "TRIPLEX_METRICS_URL", global = true)]
    pub metrics_url: Option<String>,

    /// Loki-compatible logs URL (overrides profile)
    #[arg(long, env = "TRIPLEX_LOGS_URL", global = true)]
    pub logs_url: Option<String>,

    /// JSON REST API base URL (overrides profile)
    #[arg(long, env = "TRIPLEX_REST_URL", global = true)]
    pub rest_url: Option<String>,

    /// Bearer token sent as `Authorization: Bearer`
    #[arg(long, env = "TRIPLEX_BEARER_TOKEN", global = true, hide_env_values = true)]
    pub bearer_token: Option<String>,

    /// API key sent as `X-API-Key`
    #[arg(long, env = "TRIPLEX_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output format [default: from config, else json]
    #[arg(long, short = 'o', env = "TRIPLEX_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "TRIPLEX_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "TRIPLEX_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// One table per frame
    Table,
    /// Tab-separated rows (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a batch of queries and print the normalized frames
    #[command(alias = "q")]
    Query(QueryArgs),

    /// Probe the configured backends
    Health,

    /// Send a raw request to one backend and print its answer
    Proxy(ProxyArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Query ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Batch request file (JSON); `-` or omitted reads stdin
    pub file: Option<PathBuf>,

    /// Exit non-zero if any query in the batch failed
    #[arg(long)]
    pub fail_on_error: bool,
}

// ── Proxy ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProxyArgs {
    /// Backend: prometheus (metrics), loki (logs) or rest
    pub backend: String,

    /// Path relative to the backend URL, optionally with `?query`
    pub path: String,

    /// HTTP method
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: String,

    /// Extra request header, `Name: value` (repeatable)
    #[arg(long = "header", short = 'H', value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Request body
    #[arg(long, short = 'd')]
    pub data: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive profile wizard
    Init,

    /// Show the merged configuration with secrets redacted
    Show,

    /// Store a secret for the active profile in the system keyring
    SetSecret {
        /// Which secret to store
        kind: SecretArg,

        /// Secret value (prompted for when omitted)
        value: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SecretArg {
    ApiKey,
    BearerToken,
    BasicAuthPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
