// ── Query Router ──
//
// Parses each query's payload, dispatches on its type tag and turns the
// outcome into a `DataResponse`. Never fails as a whole: every error is
// attached to the query that caused it.

use tracing::debug;

use crate::error::CoreError;
use crate::handler::{self, HandlerContext};
use crate::model::{DataQuery, DataResponse, Frame, Query, QueryKind};

/// Run one query to completion.
pub async fn route(ctx: &HandlerContext<'_>, query: &DataQuery) -> DataResponse {
    run(ctx, query).await.into()
}

async fn run(ctx: &HandlerContext<'_>, query: &DataQuery) -> Result<Vec<Frame>, CoreError> {
    let parsed = Query::parse(query)?;
    debug!(
        ref_id = %parsed.ref_id,
        query_type = %parsed.kind.query_type(),
        "handling query"
    );

    match &parsed.kind {
        QueryKind::Metrics(q) => {
            handler::metrics::execute(ctx, &parsed.time_range, parsed.interval, q).await
        }
        QueryKind::Logs(q) => handler::logs::execute(ctx, &parsed.time_range, q).await,
        QueryKind::Rest(q) => {
            handler::rest::execute(ctx, &parsed.time_range, parsed.interval, q).await
        }
    }
}
