use tracing::debug;
use url::Url;

use super::models::LogQueryData;
use crate::auth::AuthScheme;
use crate::prometheus::ApiResponse;
use crate::transport::{decode_json, ensure_success, join_url};
use crate::Error;

const BACKEND: &str = "loki";

/// Async client for one Loki endpoint.
pub struct LokiClient<'a> {
    http: &'a reqwest::Client,
    base_url: &'a Url,
    auth: &'a AuthScheme,
}

impl<'a> LokiClient<'a> {
    pub fn new(http: &'a reqwest::Client, base_url: &'a Url, auth: &'a AuthScheme) -> Self {
        Self {
            http,
            base_url,
            auth,
        }
    }

    /// `GET /loki/api/v1/query_range` with nanosecond bounds.
    pub async fn query_range(
        &self,
        expr: &str,
        start_ns: i64,
        end_ns: i64,
        limit: u32,
    ) -> Result<LogQueryData, Error> {
        let url = join_url(self.base_url, "loki/api/v1/query_range")?;
        let params = [
            ("query", expr.to_owned()),
            ("start", start_ns.to_string()),
            ("end", end_ns.to_string()),
            ("limit", limit.to_string()),
        ];
        debug!(%url, ?params, "loki range query");

        let req = self.auth.apply(self.http.get(url).query(&params));
        let resp = ensure_success(req.send().await?, BACKEND).await?;
        let envelope: ApiResponse<LogQueryData> = decode_json(resp).await?;
        envelope.into_data(BACKEND)
    }
}
