// ── Protocol handlers ──
//
// One module per backend. Each call builds its own request from the
// query and the borrowed config; no handler keeps state between calls.

pub mod logs;
pub mod metrics;
pub mod rest;

use triplex_api::AuthScheme;

use crate::config::DataSourceConfig;
use crate::error::CoreError;

/// Everything a handler borrows from its data source for one call.
#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
    pub config: &'a DataSourceConfig,
    pub http: &'a reqwest::Client,
    pub auth: &'a AuthScheme,
}

impl HandlerContext<'_> {
    /// Translate an API error against the query timeout.
    pub(crate) fn api_error(&self, err: triplex_api::Error) -> CoreError {
        CoreError::from_api(err, self.config.timeout)
    }
}

/// Reject a blank required string before any network call. A non-blank
/// value is returned untouched.
pub(crate) fn require<'s>(value: &'s str, message: &str) -> Result<&'s str, CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::configuration(message));
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn require_keeps_surrounding_whitespace() {
        assert_eq!(require(" sum(up) \n", "x").ok(), Some(" sum(up) \n"));
    }

    #[test]
    fn require_rejects_blank() {
        let err = require(" \t", "PromQL expression is required").unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }
}
