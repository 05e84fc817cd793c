// ── Runtime data source configuration ──
//
// Describes *where* the three backends live and *how* to authenticate.
// Built once per data source instance and never mutated; every handler
// borrows it. Core never reads config files: the CLI (or any other
// host) constructs a `DataSourceConfig` and hands it in.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use triplex_api::transport::{HEALTH_TIMEOUT, QUERY_TIMEOUT};
use triplex_api::{AuthScheme, BasicAuth, Credentials, TlsMode, TransportConfig};

use crate::error::CoreError;

/// Default cap on log lines returned per query.
pub const DEFAULT_LOG_LIMIT: u32 = 1000;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Immutable configuration of one data source instance.
#[derive(Debug, Clone)]
pub struct DataSourceConfig {
    /// Prometheus-compatible metrics API.
    pub metrics_url: Option<Url>,
    /// Loki-compatible logs API.
    pub logs_url: Option<Url>,
    /// Base of the generic JSON REST API.
    pub rest_url: Option<Url>,
    /// Sent with every REST request; per-query headers win on conflict.
    pub rest_headers: BTreeMap<String, String>,
    pub credentials: Credentials,
    pub tls: TlsVerification,
    /// Bound on each query's HTTP call.
    pub timeout: Duration,
    /// Bound on each health probe.
    pub health_timeout: Duration,
    /// Result cap for log queries.
    pub log_limit: u32,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            metrics_url: None,
            logs_url: None,
            rest_url: None,
            rest_headers: BTreeMap::new(),
            credentials: Credentials::default(),
            tls: TlsVerification::default(),
            timeout: QUERY_TIMEOUT,
            health_timeout: HEALTH_TIMEOUT,
            log_limit: DEFAULT_LOG_LIMIT,
        }
    }
}

impl DataSourceConfig {
    /// The one auth scheme every outgoing request will carry.
    pub fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::resolve(&self.credentials)
    }

    /// `true` if at least one backend URL is set.
    pub fn has_any_backend(&self) -> bool {
        self.metrics_url.is_some() || self.logs_url.is_some() || self.rest_url.is_some()
    }

    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }

    /// Build from a host-style settings snapshot.
    ///
    /// A malformed `jsonData` object is logged and treated as empty.
    /// Secure values override their plain counterparts. Blank URLs mean
    /// "not configured"; an unparseable URL is a configuration error.
    pub fn from_settings(settings: &DataSourceSettings) -> Result<Self, CoreError> {
        let json = if settings.json_data.is_null() {
            JsonData::default()
        } else {
            serde_json::from_value::<JsonData>(settings.json_data.clone()).unwrap_or_else(|e| {
                warn!(error = %e, "failed to parse jsonData, using defaults");
                JsonData::default()
            })
        };

        let secure = |key: &str| settings.secure_json_data.get(key).cloned();
        let api_key = secure("apiKey").or(json.api_key);
        let bearer_token = secure("bearerToken").or(json.bearer_token);
        let basic_pass = secure("basicAuthPass").or(json.basic_auth_pass);

        let basic_auth = json.basic_auth_user.map(|username| BasicAuth {
            username,
            password: SecretString::from(basic_pass.unwrap_or_default()),
        });

        Ok(Self {
            metrics_url: parse_backend_url("Prometheus", json.prometheus_url.as_deref())?,
            logs_url: parse_backend_url("Loki", json.loki_url.as_deref())?,
            rest_url: parse_backend_url("REST API", json.rest_url.as_deref())?,
            rest_headers: json.rest_headers.unwrap_or_default(),
            credentials: Credentials {
                bearer_token: bearer_token.map(SecretString::from),
                api_key: api_key.map(SecretString::from),
                basic_auth,
            },
            log_limit: json.log_limit.unwrap_or(DEFAULT_LOG_LIMIT),
            ..Self::default()
        })
    }
}

/// Parse an optional base URL; blank means "not configured".
pub fn parse_backend_url(which: &str, raw: Option<&str>) -> Result<Option<Url>, CoreError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    Url::parse(raw)
        .map(Some)
        .map_err(|e| CoreError::configuration(format!("invalid {which} URL '{raw}': {e}")))
}

// ── Host settings snapshot ──────────────────────────────────────────

/// Settings as a plugin host stores them: free-form `jsonData` plus
/// decrypted secrets.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataSourceSettings {
    pub json_data: serde_json::Value,
    pub secure_json_data: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct JsonData {
    prometheus_url: Option<String>,
    loki_url: Option<String>,
    rest_url: Option<String>,
    api_key: Option<String>,
    basic_auth_user: Option<String>,
    basic_auth_pass: Option<String>,
    bearer_token: Option<String>,
    rest_headers: Option<BTreeMap<String, String>>,
    log_limit: Option<u32>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serde_json::json;
    use triplex_api::AuthStrategy;

    fn settings(json_data: serde_json::Value, secure: &[(&str, &str)]) -> DataSourceSettings {
        DataSourceSettings {
            json_data,
            secure_json_data: secure
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        }
    }

    #[test]
    fn parses_urls_and_headers() {
        let cfg = DataSourceConfig::from_settings(&settings(
            json!({
                "prometheusUrl": "http://prom:9090",
                "lokiUrl": "",
                "restUrl": "https://api.example.com/v2/",
                "restHeaders": {"X-Tenant": "ops"},
                "logLimit": 250
            }),
            &[],
        ))
        .unwrap();

        assert_eq!(cfg.metrics_url.unwrap().as_str(), "http://prom:9090/");
        assert!(cfg.logs_url.is_none());
        assert_eq!(cfg.rest_url.unwrap().path(), "/v2/");
        assert_eq!(cfg.rest_headers["X-Tenant"], "ops");
        assert_eq!(cfg.log_limit, 250);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
    }

    #[test]
    fn secure_values_override_plain_ones() {
        let cfg = DataSourceConfig::from_settings(&settings(
            json!({"apiKey": "plain", "basicAuthUser": "u", "basicAuthPass": "plain-pass"}),
            &[("apiKey", "secure"), ("basicAuthPass", "secure-pass")],
        ))
        .unwrap();

        assert_eq!(
            cfg.credentials.api_key.as_ref().unwrap().expose_secret(),
            "secure"
        );
        let basic = cfg.credentials.basic_auth.as_ref().unwrap();
        assert_eq!(basic.password.expose_secret(), "secure-pass");
        assert_eq!(cfg.auth_scheme().strategy(), AuthStrategy::ApiKey);
    }

    #[test]
    fn secure_bearer_without_plain_fields() {
        let cfg = DataSourceConfig::from_settings(&settings(
            json!({"restUrl": "http://api"}),
            &[("bearerToken", "tok")],
        ))
        .unwrap();
        assert_eq!(cfg.auth_scheme().strategy(), AuthStrategy::Bearer);
    }

    #[test]
    fn malformed_json_data_falls_back_to_defaults() {
        let cfg =
            DataSourceConfig::from_settings(&settings(json!({"prometheusUrl": 42}), &[])).unwrap();
        assert!(!cfg.has_any_backend());
        assert_eq!(cfg.log_limit, DEFAULT_LOG_LIMIT);
    }

    #[test]
    fn bad_url_is_a_configuration_error() {
        let err = DataSourceConfig::from_settings(&settings(
            json!({"lokiUrl": "not a url"}),
            &[],
        ))
        .unwrap_err();
        assert_eq!(err.kind(), "configuration");
    }
}
