//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help
//! text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use triplex_config::ConfigError;
use triplex_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const QUERY: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach backend: {message}")]
    #[diagnostic(
        code(triplex::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Self-signed certificate? Try --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed { message: String },

    #[error("Data source is unhealthy: {message}")]
    #[diagnostic(code(triplex::unhealthy))]
    Unhealthy { message: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(triplex::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    #[error("Interrupted")]
    #[diagnostic(code(triplex::cancelled))]
    Cancelled,

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(triplex::configuration),
        help("Inspect the active profile with: triplex config show")
    )]
    Configuration { message: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(triplex::no_backends),
        help(
            "Create a profile with: triplex config init\n\
             Or pass --metrics-url, --logs-url or --rest-url.\n\
             Config file: {path}"
        )
    )]
    NoBackends { path: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(triplex::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: triplex config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(triplex::config))]
    Config(#[from] ConfigError),

    // ── Queries ──────────────────────────────────────────────────────
    #[error("{backend} returned status {status}: {detail}")]
    #[diagnostic(code(triplex::upstream_status))]
    Upstream {
        backend: String,
        status: u16,
        detail: String,
    },

    #[error("{failed} of {total} queries failed")]
    #[diagnostic(
        code(triplex::query_failed),
        help("Per-query errors are included in the printed results.")
    )]
    QueryFailed { failed: usize, total: usize },

    #[error("Query error ({kind}): {message}")]
    #[diagnostic(code(triplex::query))]
    Query { kind: &'static str, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(triplex::validation))]
    Validation { field: String, reason: String },

    #[error("Invalid batch request: {0}")]
    #[diagnostic(
        code(triplex::json),
        help("Expected a JSON object with a \"queries\" array, each entry carrying refId and queryType.")
    )]
    Json(#[from] serde_json::Error),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Unhealthy { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Configuration { .. }
            | Self::NoBackends { .. }
            | Self::ProfileNotFound { .. }
            | Self::Config(_) => exit_code::CONFIG,
            Self::Validation { .. } | Self::Json(_) => exit_code::USAGE,
            _ => exit_code::QUERY,
        }
    }

    pub(crate) fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Configuration { message } => Self::Configuration { message },
            CoreError::Transport { message } => Self::ConnectionFailed { message },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::Cancelled => Self::Cancelled,
            CoreError::UpstreamStatus {
                backend,
                status,
                detail,
            } => Self::Upstream {
                backend,
                status,
                detail,
            },
            other @ (CoreError::Parse { .. } | CoreError::UnsupportedQueryType { .. }) => {
                Self::Query {
                    kind: other.kind(),
                    message: other.to_string(),
                }
            }
        }
    }
}
