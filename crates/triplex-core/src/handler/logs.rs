use tracing::debug;
use triplex_api::LokiClient;

use super::{HandlerContext, require};
use crate::error::CoreError;
use crate::model::{Frame, LogsQuery, TimeRange};
use crate::normalize::log_frames;

pub async fn execute(
    ctx: &HandlerContext<'_>,
    range: &TimeRange,
    query: &LogsQuery,
) -> Result<Vec<Frame>, CoreError> {
    let base = ctx
        .config
        .logs_url
        .as_ref()
        .ok_or_else(|| CoreError::configuration("Loki URL not configured"))?;
    let expr = require(&query.expr, "LogQL expression is required")?;

    let start = range
        .from
        .timestamp_nanos_opt()
        .ok_or_else(|| CoreError::configuration("range start is outside the nanosecond range"))?;
    let end = range
        .to
        .timestamp_nanos_opt()
        .ok_or_else(|| CoreError::configuration("range end is outside the nanosecond range"))?;

    debug!(expr, start, end, limit = ctx.config.log_limit, "executing logs query");
    let data = LokiClient::new(ctx.http, base, ctx.auth)
        .query_range(expr, start, end, ctx.config.log_limit)
        .await
        .map_err(|e| ctx.api_error(e))?;

    log_frames(data)
}
