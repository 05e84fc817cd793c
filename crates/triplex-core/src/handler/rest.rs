use std::collections::BTreeMap;
use std::time::Duration;

use tracing::debug;
use triplex_api::{RestClient, RestRequest};

use super::{HandlerContext, require};
use crate::error::CoreError;
use crate::model::{Frame, RestQuery, TimeRange};
use crate::normalize::{RestContext, rest_frames};

pub async fn execute(
    ctx: &HandlerContext<'_>,
    range: &TimeRange,
    interval: Option<Duration>,
    query: &RestQuery,
) -> Result<Vec<Frame>, CoreError> {
    let endpoint = require(&query.endpoint, "REST endpoint is required")?;
    let base = ctx
        .config
        .rest_url
        .as_ref()
        .ok_or_else(|| CoreError::configuration("REST API base URL not configured"))?;

    let no_headers = BTreeMap::new();
    let request = RestRequest::new(
        base,
        endpoint,
        query.method.as_deref(),
        &ctx.config.rest_headers,
        query.headers.as_ref().unwrap_or(&no_headers),
        query.body.as_deref(),
    )
    .map_err(|e| ctx.api_error(e))?;
    debug!(method = %request.method, url = %request.url, "executing REST query");

    let body = RestClient::new(ctx.http, ctx.auth)
        .execute(request)
        .await
        .map_err(|e| ctx.api_error(e))?;

    Ok(rest_frames(&body, &RestContext::new(range.from, interval)))
}
