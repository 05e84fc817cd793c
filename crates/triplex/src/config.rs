//! Translation from config profile + global flags to a `DataSourceConfig`.
//!
//! Flags win over the profile; the profile wins over built-in defaults.

use std::time::Duration;

use clap::ValueEnum;
use secrecy::SecretString;

use triplex_config::{Config, Profile};
use triplex_core::config::parse_backend_url;
use triplex_core::{DataSourceConfig, DataSourceSettings, TlsVerification};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Load the config file, mapping load failures to config errors.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let cfg = triplex_config::load_config()?;
    if let Some(ref name) = global.profile {
        if !cfg.profiles.contains_key(name) && !has_flag_backend(global) {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name: name.clone(),
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
    }
    Ok(cfg)
}

/// Output format: `--output`, else the config default, else JSON.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&cfg.defaults.output, true).unwrap_or(OutputFormat::Json)
    })
}

fn has_flag_backend(global: &GlobalOpts) -> bool {
    global.metrics_url.is_some() || global.logs_url.is_some() || global.rest_url.is_some()
}

/// Data source config for the active profile with flag overrides.
pub fn from_profile(global: &GlobalOpts, cfg: &Config) -> Result<DataSourceConfig, CliError> {
    let profile_name = cfg.profile_name(global.profile.as_deref());
    let fallback = Profile::default();
    let profile = cfg.profiles.get(profile_name).unwrap_or(&fallback);

    let ds = triplex_config::profile_to_datasource_config(profile, profile_name, &cfg.defaults)?;
    apply_overrides(ds, global)
}

/// Data source config from a host-style settings snapshot with flag
/// overrides.
pub fn from_settings(
    global: &GlobalOpts,
    settings: &DataSourceSettings,
) -> Result<DataSourceConfig, CliError> {
    let ds = DataSourceConfig::from_settings(settings)?;
    apply_overrides(ds, global)
}

fn flag_url(field: &str, raw: Option<&str>) -> Result<Option<url::Url>, CliError> {
    parse_backend_url(field, raw).map_err(|e| CliError::validation(field, e.to_string()))
}

fn apply_overrides(
    mut ds: DataSourceConfig,
    global: &GlobalOpts,
) -> Result<DataSourceConfig, CliError> {
    if let Some(url) = flag_url("metrics-url", global.metrics_url.as_deref())? {
        ds.metrics_url = Some(url);
    }
    if let Some(url) = flag_url("logs-url", global.logs_url.as_deref())? {
        ds.logs_url = Some(url);
    }
    if let Some(url) = flag_url("rest-url", global.rest_url.as_deref())? {
        ds.rest_url = Some(url);
    }

    if let Some(ref token) = global.bearer_token {
        ds.credentials.bearer_token = Some(SecretString::from(token.clone()));
    }
    if let Some(ref key) = global.api_key {
        ds.credentials.api_key = Some(SecretString::from(key.clone()));
    }

    if global.insecure {
        ds.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        ds.timeout = Duration::from_secs(secs);
    }
    Ok(ds)
}
