// ── DataSource ──
//
// One configured data source instance: the immutable config, one shared
// HTTP client and the resolved auth scheme. Queries in a batch run
// concurrently and each owns its own request lifecycle.

use std::sync::Arc;

use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use triplex_api::{AuthScheme, ProxyRequest, ProxyResponse};

use crate::config::DataSourceConfig;
use crate::error::CoreError;
use crate::handler::HandlerContext;
use crate::health::{self, CheckHealthResult};
use crate::model::{DataQuery, DataResponse, QueryDataResponse};
use crate::{proxy, router};

/// A ready-to-use data source.
///
/// Cheaply cloneable via `Arc<DataSourceInner>`.
#[derive(Clone)]
pub struct DataSource {
    inner: Arc<DataSourceInner>,
}

struct DataSourceInner {
    config: DataSourceConfig,
    http: reqwest::Client,
    auth: AuthScheme,
}

impl DataSource {
    /// Build the HTTP client and resolve credentials. Does no I/O.
    pub fn new(config: DataSourceConfig) -> Result<Self, CoreError> {
        let http = config
            .transport()
            .build_client()
            .map_err(|e| CoreError::from_api(e, config.timeout))?;
        let auth = config.auth_scheme();

        info!(
            metrics_url = config.metrics_url.as_ref().map(url::Url::as_str),
            logs_url = config.logs_url.as_ref().map(url::Url::as_str),
            rest_url = config.rest_url.as_ref().map(url::Url::as_str),
            auth = ?auth.strategy(),
            "data source initialized"
        );

        Ok(Self {
            inner: Arc::new(DataSourceInner { config, http, auth }),
        })
    }

    pub fn config(&self) -> &DataSourceConfig {
        &self.inner.config
    }

    fn context(&self) -> HandlerContext<'_> {
        HandlerContext {
            config: &self.inner.config,
            http: &self.inner.http,
            auth: &self.inner.auth,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Run every query concurrently; one result per identifier.
    ///
    /// Cancelling `cancel` resolves every still-running query with
    /// [`CoreError::Cancelled`] and drops its in-flight request.
    pub async fn query_data(
        &self,
        queries: &[DataQuery],
        cancel: &CancellationToken,
    ) -> QueryDataResponse {
        let ctx = self.context();
        let ctx = &ctx;
        debug!(count = queries.len(), "running query batch");

        let runs = queries.iter().map(|query| async move {
            let response = tokio::select! {
                biased;
                () = cancel.cancelled() => DataResponse::Error(CoreError::Cancelled),
                response = router::route(ctx, query) => response,
            };
            (query.ref_id.clone(), response)
        });

        let mut result = QueryDataResponse::default();
        for (ref_id, response) in join_all(runs).await {
            result.insert(ref_id, response);
        }
        debug!(
            count = result.len(),
            failed = result.error_count(),
            "query batch finished"
        );
        result
    }

    // ── Health ───────────────────────────────────────────────────────

    pub async fn check_health(&self, cancel: &CancellationToken) -> CheckHealthResult {
        let ctx = self.context();
        tokio::select! {
            biased;
            () = cancel.cancelled() => CheckHealthResult::error("Health check cancelled"),
            result = health::check(&ctx) => result,
        }
    }

    // ── Proxy ────────────────────────────────────────────────────────

    /// Relay a raw request to the backend named `backend`.
    pub async fn call_resource(&self, backend: &str, request: ProxyRequest) -> ProxyResponse {
        proxy::call(&self.context(), backend, request).await
    }
}
