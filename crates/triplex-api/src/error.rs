use thiserror::Error;

/// Top-level error type for the `triplex-api` crate.
///
/// Covers every failure mode across the three backend clients and the
/// proxy path. `triplex-core` maps these into the per-query error kinds
/// that end up in a query result.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A caller-supplied header could not be encoded.
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// A caller-supplied HTTP method is not a valid token.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// TLS setup error (unreadable or invalid CA bundle).
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Upstream ────────────────────────────────────────────────────
    /// The backend answered outside the 2xx range.
    #[error("{backend} API returned status {status}: {body}")]
    UpstreamStatus {
        backend: &'static str,
        status: u16,
        body: String,
    },

    /// The backend answered 2xx but its `{status, data}` envelope says otherwise.
    #[error("{backend} query failed: {message}")]
    Envelope {
        backend: &'static str,
        status: String,
        error_type: Option<String>,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the request hit the client-side timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// The upstream HTTP status, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamStatus { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Longest body excerpt carried inside an error.
pub(crate) const BODY_EXCERPT_LEN: usize = 512;

/// Truncate `body` to at most [`BODY_EXCERPT_LEN`] bytes on a char boundary.
pub(crate) fn excerpt(body: &str) -> String {
    if body.len() <= BODY_EXCERPT_LEN {
        return body.to_owned();
    }
    let mut end = BODY_EXCERPT_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
