// Shared transport configuration and response plumbing.
//
// All three backend clients and the proxy share one `reqwest::Client`
// built here, so the connection pool is process-wide while every
// request keeps its own lifecycle.

use std::path::PathBuf;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::trace;
use url::Url;

use crate::error::{Error, excerpt};

/// Default bound for query execution.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound for health probes.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-signed lab backends).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: QUERY_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("triplex/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

// ── URL helpers ─────────────────────────────────────────────────────

/// Join `path` onto `base` with exactly one `/` between them.
///
/// Trailing slashes on the base and leading slashes on the path are
/// trimmed first, so `http://h/api/` + `/v1/x` gives `http://h/api/v1/x`.
/// Any query string carried by `path` is kept.
pub fn join_url(base: &Url, path: &str) -> Result<Url, Error> {
    let base = base.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Ok(Url::parse(&format!("{base}/{path}"))?)
}

// ── Response helpers ────────────────────────────────────────────────

/// Fail with [`Error::UpstreamStatus`] unless the status is 2xx.
pub(crate) async fn ensure_success(
    resp: reqwest::Response,
    backend: &'static str,
) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::UpstreamStatus {
        backend,
        status: status.as_u16(),
        body: excerpt(&body),
    })
}

/// Characters of the body quoted in a decode error message.
const BODY_PREVIEW_CHARS: usize = 200;

/// Read the whole body and decode it as JSON.
pub(crate) async fn decode_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let body = resp.text().await?;
    trace!(bytes = body.len(), "decoding response body");
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}
