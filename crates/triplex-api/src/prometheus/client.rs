use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;
use url::Url;

use super::models::{ApiResponse, QueryData};
use crate::auth::AuthScheme;
use crate::transport::{decode_json, ensure_success, join_url};
use crate::Error;

const BACKEND: &str = "prometheus";

/// Bounds of a range query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeParams {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub step: Duration,
}

impl RangeParams {
    /// Whole seconds render as `15s`, anything finer as milliseconds.
    pub fn step_param(&self) -> String {
        if self.step.subsec_millis() == 0 {
            format!("{}s", self.step.as_secs())
        } else {
            format!("{}ms", self.step.as_millis())
        }
    }
}

/// Async client for one Prometheus-compatible endpoint.
///
/// Borrows the shared HTTP client and auth scheme; construct one per
/// request, it holds nothing of its own.
pub struct PrometheusClient<'a> {
    http: &'a reqwest::Client,
    base_url: &'a Url,
    auth: &'a AuthScheme,
}

impl<'a> PrometheusClient<'a> {
    pub fn new(http: &'a reqwest::Client, base_url: &'a Url, auth: &'a AuthScheme) -> Self {
        Self {
            http,
            base_url,
            auth,
        }
    }

    /// `GET /api/v1/query?query=<expr>&time=<unix secs>`
    pub async fn instant_query(
        &self,
        expr: &str,
        time: DateTime<Utc>,
    ) -> Result<QueryData, Error> {
        let url = join_url(self.base_url, "api/v1/query")?;
        let params = [("query", expr.to_owned()), ("time", time.timestamp().to_string())];
        debug!(%url, ?params, "prometheus instant query");
        self.fetch(url, &params).await
    }

    /// `GET /api/v1/query_range?query=<expr>&start=..&end=..&step=..`
    pub async fn range_query(&self, expr: &str, range: RangeParams) -> Result<QueryData, Error> {
        let url = join_url(self.base_url, "api/v1/query_range")?;
        let params = [
            ("query", expr.to_owned()),
            ("start", range.start.timestamp().to_string()),
            ("end", range.end.timestamp().to_string()),
            ("step", range.step_param()),
        ];
        debug!(%url, ?params, "prometheus range query");
        self.fetch(url, &params).await
    }

    /// `GET /-/healthy`, bounded by `timeout`. Any 2xx is healthy.
    pub async fn health(&self, timeout: Duration) -> Result<(), Error> {
        let url = join_url(self.base_url, "-/healthy")?;
        debug!(%url, "prometheus health probe");
        let req = self.auth.apply(self.http.get(url).timeout(timeout));
        ensure_success(req.send().await?, BACKEND).await?;
        Ok(())
    }

    async fn fetch(&self, url: Url, params: &[(&str, String)]) -> Result<QueryData, Error> {
        let req = self.auth.apply(self.http.get(url).query(params));
        let resp = ensure_success(req.send().await?, BACKEND).await?;
        let envelope: ApiResponse<QueryData> = decode_json(resp).await?;
        for warning in &envelope.warnings {
            debug!(warning, "prometheus warning");
        }
        envelope.into_data(BACKEND)
    }
}
