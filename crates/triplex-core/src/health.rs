// ── Connectivity Prober ──
//
// One lightweight GET to the metrics backend, bounded by the health
// timeout. The result is one instance-level status, never a
// per-query error.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};
use triplex_api::PrometheusClient;

use crate::error::CoreError;
use crate::handler::HandlerContext;

pub const NO_BACKENDS_MESSAGE: &str =
    "No data source URLs configured. Please configure at least one data source.";
pub const READY_MESSAGE: &str = "Data source is ready";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Ok,
    Error,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("OK"),
            Self::Error => f.write_str("ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckHealthResult {
    pub status: HealthStatus,
    pub message: String,
}

impl CheckHealthResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Ok,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Error,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}

/// Probe the metrics backend (`/-/healthy`) when one is configured.
/// Logs and REST backends are never contacted.
pub async fn check(ctx: &HandlerContext<'_>) -> CheckHealthResult {
    let config = ctx.config;
    if !config.has_any_backend() {
        return CheckHealthResult::error(NO_BACKENDS_MESSAGE);
    }

    let timeout = config.health_timeout;
    let result = match &config.metrics_url {
        Some(url) => match PrometheusClient::new(ctx.http, url, ctx.auth)
            .health(timeout)
            .await
        {
            Ok(()) => CheckHealthResult::ok(READY_MESSAGE),
            Err(e) => CheckHealthResult::error(format!(
                "Prometheus connection issue: {}",
                CoreError::from_api(e, timeout)
            )),
        },
        None => CheckHealthResult::ok(READY_MESSAGE),
    };

    if result.is_ok() {
        info!("health check passed");
    } else {
        debug!(message = %result.message, "health check failed");
    }
    result
}
