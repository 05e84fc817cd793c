use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;
use triplex_api::PrometheusClient;
use triplex_api::prometheus::RangeParams;

use super::{HandlerContext, require};
use crate::error::CoreError;
use crate::model::{Frame, MetricsQuery, TimeRange};
use crate::normalize::metric_frames;

/// Step used for range queries when the query gives no interval.
pub const DEFAULT_STEP: Duration = Duration::from_secs(15);

/// Instant or range, decided by the shape of the time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromRequest {
    /// Evaluated at the range end.
    Instant { time: DateTime<Utc> },
    Range(RangeParams),
}

impl PromRequest {
    pub fn plan(range: &TimeRange, interval: Option<Duration>) -> Self {
        if range.is_instant() {
            return Self::Instant { time: range.to };
        }
        Self::Range(RangeParams {
            start: range.from,
            end: range.to,
            step: interval.filter(|d| !d.is_zero()).unwrap_or(DEFAULT_STEP),
        })
    }
}

pub async fn execute(
    ctx: &HandlerContext<'_>,
    range: &TimeRange,
    interval: Option<Duration>,
    query: &MetricsQuery,
) -> Result<Vec<Frame>, CoreError> {
    let base = ctx
        .config
        .metrics_url
        .as_ref()
        .ok_or_else(|| CoreError::configuration("Prometheus URL not configured"))?;
    let expr = require(&query.expr, "PromQL expression is required")?;

    let client = PrometheusClient::new(ctx.http, base, ctx.auth);
    let plan = PromRequest::plan(range, interval);
    debug!(?plan, expr, "executing metrics query");

    let data = match plan {
        PromRequest::Instant { time } => client.instant_query(expr, time).await,
        PromRequest::Range(params) => client.range_query(expr, params).await,
    }
    .map_err(|e| ctx.api_error(e))?;

    metric_frames(data)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn equal_bounds_plan_an_instant_query() {
        let range = TimeRange::instant(at(1_700_000_000));
        assert_eq!(
            PromRequest::plan(&range, Some(Duration::from_secs(60))),
            PromRequest::Instant {
                time: at(1_700_000_000)
            }
        );
    }

    #[test]
    fn range_uses_interval_or_default_step() {
        let range = TimeRange {
            from: at(1_700_000_000),
            to: at(1_700_003_600),
        };
        let PromRequest::Range(params) = PromRequest::plan(&range, None) else {
            panic!("expected range");
        };
        assert_eq!(params.step, DEFAULT_STEP);

        let PromRequest::Range(params) = PromRequest::plan(&range, Some(Duration::from_secs(60)))
        else {
            panic!("expected range");
        };
        assert_eq!(params.step, Duration::from_secs(60));
        assert_eq!(params.start, at(1_700_000_000));
        assert_eq!(params.end, at(1_700_003_600));
    }
}
