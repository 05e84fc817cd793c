//! Configuration for the triplex CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `triplex_core::DataSourceConfig`. The CLI layers
//! its global flags on top.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;
use tracing::debug;

use triplex_core::config::{DEFAULT_LOG_LIMIT, parse_backend_url};
use triplex_core::{BasicAuth, Credentials, DataSourceConfig, TlsVerification};

/// Keyring service name; entries are `<profile>/<secret>` under it.
pub const KEYRING_SERVICE: &str = "triplex";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "TRIPLEX_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named data source profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Explicit name, else `default_profile`, else `"default"`.
    pub fn profile_name<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .or(self.default_profile.as_deref())
            .unwrap_or("default")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Query timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "json".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named data source profile. Every field is optional; a profile with
/// no URLs is valid and simply reports itself unconfigured.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Prometheus-compatible metrics API.
    pub metrics_url: Option<String>,

    /// Loki-compatible logs API.
    pub logs_url: Option<String>,

    /// Generic JSON REST API base.
    pub rest_url: Option<String>,

    /// Bearer token (plaintext; prefer keyring or env var).
    pub bearer_token: Option<String>,

    /// Environment variable holding the bearer token.
    pub bearer_token_env: Option<String>,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable holding the API key.
    pub api_key_env: Option<String>,

    /// Basic auth username.
    pub basic_auth_user: Option<String>,

    /// Basic auth password (plaintext; prefer keyring or env var).
    pub basic_auth_password: Option<String>,

    /// Environment variable holding the basic auth password.
    pub basic_auth_password_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    pub insecure: Option<bool>,

    /// Query timeout override, seconds.
    pub timeout: Option<u64>,

    /// Health probe timeout, seconds.
    pub health_timeout: Option<u64>,

    /// Max log lines per logs query.
    pub log_limit: Option<u32>,

    /// Headers sent with every REST request.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rest_headers: BTreeMap<String, String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `TRIPLEX_CONFIG`, else the platform
/// config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("dev", "triplex", "triplex").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("triplex");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` merged with `TRIPLEX_`-prefixed environment
/// variables. Nested keys use `__`, e.g.
/// `TRIPLEX_PROFILES__DEFAULT__METRICS_URL`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TRIPLEX_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Secrets a profile can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum SecretKind {
    ApiKey,
    BearerToken,
    BasicAuthPassword,
}

impl SecretKind {
    fn env_var<'p>(self, profile: &'p Profile) -> Option<&'p str> {
        match self {
            Self::ApiKey => profile.api_key_env.as_deref(),
            Self::BearerToken => profile.bearer_token_env.as_deref(),
            Self::BasicAuthPassword => profile.basic_auth_password_env.as_deref(),
        }
    }

    fn plaintext(self, profile: &Profile) -> Option<&str> {
        match self {
            Self::ApiKey => profile.api_key.as_deref(),
            Self::BearerToken => profile.bearer_token.as_deref(),
            Self::BasicAuthPassword => profile.basic_auth_password.as_deref(),
        }
    }

    /// Keyring user name for this secret under `profile_name`.
    pub fn keyring_user(self, profile_name: &str) -> String {
        format!("{profile_name}/{self}")
    }
}

/// Resolve one secret: `<secret>_env` variable, else system keyring,
/// else plaintext. Blank values count as absent.
pub fn resolve_secret(
    profile: &Profile,
    profile_name: &str,
    kind: SecretKind,
) -> Option<SecretString> {
    // 1. Profile's *_env → env var lookup
    if let Some(env_name) = kind.env_var(profile) {
        if let Ok(val) = std::env::var(env_name) {
            if !val.is_empty() {
                return Some(SecretString::from(val));
            }
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_user(profile_name)) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    kind.plaintext(profile)
        .filter(|s| !s.is_empty())
        .map(|s| SecretString::from(s.to_owned()))
}

/// Store a secret in the system keyring.
pub fn store_secret(profile_name: &str, kind: SecretKind, value: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &kind.keyring_user(profile_name))
        .and_then(|entry| entry.set_password(value))
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

/// Every credential the profile can produce. Precedence between them is
/// decided later, per request.
pub fn resolve_credentials(profile: &Profile, profile_name: &str) -> Credentials {
    let basic_auth = profile.basic_auth_user.clone().map(|username| BasicAuth {
        username,
        password: resolve_secret(profile, profile_name, SecretKind::BasicAuthPassword)
            .unwrap_or_else(|| SecretString::from(String::new())),
    });

    Credentials {
        bearer_token: resolve_secret(profile, profile_name, SecretKind::BearerToken),
        api_key: resolve_secret(profile, profile_name, SecretKind::ApiKey),
        basic_auth,
    }
}

// ── Translation ─────────────────────────────────────────────────────

fn backend_url(field: &str, raw: Option<&str>) -> Result<Option<url::Url>, ConfigError> {
    parse_backend_url(field, raw).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: e.to_string(),
    })
}

/// Build a `DataSourceConfig` from a profile, no CLI flag overrides.
pub fn profile_to_datasource_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<DataSourceConfig, ConfigError> {
    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let base = DataSourceConfig::default();
    Ok(DataSourceConfig {
        metrics_url: backend_url("metrics_url", profile.metrics_url.as_deref())?,
        logs_url: backend_url("logs_url", profile.logs_url.as_deref())?,
        rest_url: backend_url("rest_url", profile.rest_url.as_deref())?,
        rest_headers: profile.rest_headers.clone(),
        credentials: resolve_credentials(profile, profile_name),
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        health_timeout: profile
            .health_timeout
            .map_or(base.health_timeout, Duration::from_secs),
        log_limit: profile.log_limit.unwrap_or(DEFAULT_LOG_LIMIT),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
output = "table"
timeout = 10

[profiles.lab]
metrics_url = "http://prom.lab:9090"
logs_url = "http://loki.lab:3100"
rest_headers = { "X-Tenant" = "lab" }
basic_auth_user = "grafana"
basic_auth_password = "hunter2"
log_limit = 200

[profiles.empty]
"#;

    fn sample_config() -> Config {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        load_config_from(&path).unwrap()
    }

    #[test]
    fn loads_profiles_and_defaults() {
        let cfg = sample_config();
        assert_eq!(cfg.profile_name(None), "lab");
        assert_eq!(cfg.profile_name(Some("empty")), "empty");
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.defaults.color, "auto");
        assert_eq!(cfg.profiles.len(), 2);
        assert_eq!(cfg.profiles["lab"].rest_headers["X-Tenant"], "lab");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn profile_translates_to_datasource_config() {
        let cfg = sample_config();
        let ds = profile_to_datasource_config(
            &cfg.profiles["lab"],
            "triplex-test-lab",
            &cfg.defaults,
        )
        .unwrap();

        assert_eq!(ds.metrics_url.unwrap().host_str(), Some("prom.lab"));
        assert!(ds.rest_url.is_none());
        assert_eq!(ds.timeout, Duration::from_secs(10));
        assert_eq!(ds.health_timeout, Duration::from_secs(5));
        assert_eq!(ds.log_limit, 200);
        assert_eq!(ds.tls, TlsVerification::SystemDefaults);
        let basic = ds.credentials.basic_auth.unwrap();
        assert_eq!(basic.username, "grafana");
        assert_eq!(basic.password.expose_secret(), "hunter2");
    }

    #[test]
    fn empty_profile_has_no_backends() {
        let cfg = sample_config();
        let ds = profile_to_datasource_config(
            &cfg.profiles["empty"],
            "triplex-test-empty",
            &cfg.defaults,
        )
        .unwrap();
        assert!(!ds.has_any_backend());
        assert_eq!(ds.log_limit, DEFAULT_LOG_LIMIT);
    }

    #[test]
    fn invalid_url_is_a_validation_error() {
        let profile = Profile {
            rest_url: Some("::nope::".into()),
            ..Profile::default()
        };
        let err =
            profile_to_datasource_config(&profile, "triplex-test-bad", &Defaults::default())
                .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "rest_url"));
    }

    #[test]
    fn env_var_secret_wins_over_plaintext() {
        // `set_var` is unsafe in edition 2024; PATH is always present.
        let profile = Profile {
            bearer_token: Some("plain".into()),
            bearer_token_env: Some("PATH".into()),
            ..Profile::default()
        };
        let token = resolve_secret(&profile, "triplex-test-env", SecretKind::BearerToken).unwrap();
        assert_eq!(token.expose_secret(), std::env::var("PATH").unwrap());
    }

    #[test]
    fn unset_env_var_falls_back_to_plaintext() {
        let profile = Profile {
            api_key: Some("plain-key".into()),
            api_key_env: Some("TRIPLEX_TEST_SURELY_UNSET_VARIABLE".into()),
            ..Profile::default()
        };
        let key = resolve_secret(&profile, "triplex-test-plain", SecretKind::ApiKey).unwrap();
        assert_eq!(key.expose_secret(), "plain-key");
    }

    #[test]
    fn secret_kinds_have_stable_keyring_names() {
        assert_eq!(SecretKind::ApiKey.keyring_user("prod"), "prod/api-key");
        assert_eq!(
            SecretKind::BasicAuthPassword.keyring_user("prod"),
            "prod/basic-auth-password"
        );
        assert_eq!("bearer-token".parse::<SecretKind>().unwrap(), SecretKind::BearerToken);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = sample_config();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        save_config_to(&cfg, &path).unwrap();
        let reloaded = load_config_from(&path).unwrap();
        assert_eq!(reloaded.profiles["lab"].log_limit, Some(200));
    }
}
