// ── Proxy routing ──
//
// Maps a backend name onto its configured base URL and relays the raw
// request. All outcomes are HTTP answers; nothing here returns `Err`.

use strum::{Display, EnumString};
use tracing::warn;
use url::Url;

use triplex_api::{ProxyRequest, ProxyResponse, proxy};

use crate::handler::HandlerContext;

/// Backend addressed by a proxy call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Backend {
    #[strum(to_string = "prometheus", serialize = "metrics")]
    Metrics,
    #[strum(to_string = "loki", serialize = "logs")]
    Logs,
    #[strum(to_string = "rest")]
    Rest,
}

impl Backend {
    fn base_url<'c>(self, ctx: &HandlerContext<'c>) -> Option<&'c Url> {
        match self {
            Self::Metrics => ctx.config.metrics_url.as_ref(),
            Self::Logs => ctx.config.logs_url.as_ref(),
            Self::Rest => ctx.config.rest_url.as_ref(),
        }
    }

    fn not_configured(self) -> &'static str {
        match self {
            Self::Metrics => "Prometheus URL not configured",
            Self::Logs => "Loki URL not configured",
            Self::Rest => "REST API base URL not configured",
        }
    }
}

/// Relay `request` to the backend named `backend`.
///
/// Unknown name → 404, unconfigured backend → 400, transport failure →
/// 500. Any answer from the backend is passed through untouched.
pub async fn call(ctx: &HandlerContext<'_>, backend: &str, request: ProxyRequest) -> ProxyResponse {
    let Ok(backend) = backend.parse::<Backend>() else {
        return ProxyResponse::error(404, "Unknown resource path");
    };
    let Some(base) = backend.base_url(ctx) else {
        return ProxyResponse::error(400, backend.not_configured());
    };

    match proxy::forward(ctx.http, base, ctx.auth, request).await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(%backend, error = %e, "proxy request failed");
            ProxyResponse::error(500, &format!("Request failed: {e}"))
        }
    }
}
