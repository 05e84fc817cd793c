// ── Core error types ──
//
// Per-query failures. Every variant maps to one stable kind label so a
// result consumer can branch on the kind without parsing the message.
// The `from_api` conversion translates transport-layer errors.

use std::time::Duration;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Before any network call ──────────────────────────────────────
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Unsupported query type: {query_type}")]
    UnsupportedQueryType { query_type: String },

    // ── Transport ────────────────────────────────────────────────────
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Request cancelled")]
    Cancelled,

    // ── Upstream ─────────────────────────────────────────────────────
    #[error("{backend} returned status {status}: {detail}")]
    UpstreamStatus {
        backend: String,
        /// HTTP status; 200 when the envelope itself reported failure.
        status: u16,
        detail: String,
    },

    // ── Data ─────────────────────────────────────────────────────────
    #[error("Parse error: {message}")]
    Parse { message: String },
}

impl CoreError {
    /// Stable machine label for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::UnsupportedQueryType { .. } => "unsupported_query_type",
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::Cancelled => "cancelled",
            Self::UpstreamStatus { .. } => "upstream_status",
            Self::Parse { .. } => "parse",
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Translate an API error, reporting timeouts against `timeout`.
    pub fn from_api(err: triplex_api::Error, timeout: Duration) -> Self {
        use triplex_api::Error as Api;

        match err {
            Api::Transport(ref e) if e.is_timeout() => Self::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            Api::Transport(ref e) if e.is_builder() => Self::Configuration {
                message: e.to_string(),
            },
            Api::Transport(ref e) if e.is_decode() => Self::Parse {
                message: e.to_string(),
            },
            Api::Transport(e) => Self::Transport {
                message: e.to_string(),
            },
            Api::InvalidUrl(e) => Self::Configuration {
                message: format!("invalid URL: {e}"),
            },
            Api::InvalidHeader { name, reason } => Self::Configuration {
                message: format!("invalid header '{name}': {reason}"),
            },
            Api::InvalidMethod(method) => Self::Configuration {
                message: format!("invalid HTTP method '{method}'"),
            },
            Api::Tls(message) => Self::Configuration { message },
            Api::UpstreamStatus {
                backend,
                status,
                body,
            } => Self::UpstreamStatus {
                backend: backend.into(),
                status,
                detail: body,
            },
            Api::Envelope {
                backend, message, ..
            } => Self::UpstreamStatus {
                backend: backend.into(),
                status: 200,
                detail: message,
            },
            Api::Deserialization { message, body: _ } => Self::Parse { message },
        }
    }
}

impl From<triplex_api::Error> for CoreError {
    fn from(err: triplex_api::Error) -> Self {
        Self::from_api(err, triplex_api::transport::QUERY_TIMEOUT)
    }
}
