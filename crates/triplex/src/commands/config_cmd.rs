//! Config subcommand handlers.

use dialoguer::{Input, Select};

use triplex_config::{Config, Profile, SecretKind};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, SecretArg};
use crate::error::CliError;
use crate::{config, output};

const REDACTED: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::validation("interactive", format!("prompt failed: {e}"))
}

/// Optional URL prompt; blank leaves the backend unconfigured.
fn prompt_url(prompt: &str) -> Result<Option<String>, CliError> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    url::Url::parse(raw).map_err(|e| CliError::validation(prompt, e.to_string()))?;
    Ok(Some(raw.to_owned()))
}

fn secret_kind(arg: SecretArg) -> SecretKind {
    match arg {
        SecretArg::ApiKey => SecretKind::ApiKey,
        SecretArg::BearerToken => SecretKind::BearerToken,
        SecretArg::BasicAuthPassword => SecretKind::BasicAuthPassword,
    }
}

/// Ask where a secret should live; `Some` means plaintext in the config.
fn store_secret_interactively(
    profile_name: &str,
    kind: SecretKind,
    value: String,
) -> Result<Option<String>, CliError> {
    let store_choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(format!("Where to store the {kind}?"))
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        triplex_config::store_secret(profile_name, kind, &value)?;
        eprintln!("   ✓ {kind} stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(value))
    }
}

/// Copy of the config with every plaintext secret masked.
fn redacted(cfg: &Config) -> Config {
    let mask = |s: &Option<String>| s.as_ref().map(|_| REDACTED.to_owned());
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        profile.api_key = mask(&profile.api_key);
        profile.bearer_token = mask(&profile.bearer_token);
        profile.basic_auth_password = mask(&profile.basic_auth_password);
    }
    cfg
}

// ── Init ────────────────────────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = triplex_config::config_path();
    eprintln!("triplex configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let mut profile = Profile {
        metrics_url: prompt_url("Prometheus URL (blank to skip)")?,
        logs_url: prompt_url("Loki URL (blank to skip)")?,
        rest_url: prompt_url("REST API base URL (blank to skip)")?,
        ..Profile::default()
    };

    let auth_choices = &["None", "Bearer token", "API key", "Basic auth"];
    let auth_selection = Select::new()
        .with_prompt("Authentication method")
        .items(auth_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    match auth_selection {
        1 => {
            let token = rpassword::prompt_password("Bearer token: ").map_err(prompt_err)?;
            profile.bearer_token =
                store_secret_interactively(&profile_name, SecretKind::BearerToken, token)?;
        }
        2 => {
            let key = rpassword::prompt_password("API key: ").map_err(prompt_err)?;
            profile.api_key = store_secret_interactively(&profile_name, SecretKind::ApiKey, key)?;
        }
        3 => {
            let user: String = Input::new()
                .with_prompt("Username")
                .interact_text()
                .map_err(prompt_err)?;
            let pass = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if user.is_empty() || pass.is_empty() {
                return Err(CliError::validation(
                    "basic_auth",
                    "username and password cannot be empty",
                ));
            }
            profile.basic_auth_user = Some(user);
            profile.basic_auth_password =
                store_secret_interactively(&profile_name, SecretKind::BasicAuthPassword, pass)?;
        }
        _ => {}
    }

    let mut cfg = triplex_config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    if cfg.default_profile.is_none() || cfg.profiles.len() == 1 {
        cfg.default_profile = Some(profile_name.clone());
    }

    let path = triplex_config::save_config(&cfg)?;
    eprintln!("\n✓ Configuration written to {}", path.display());
    eprintln!("  Profile: {profile_name}");
    eprintln!("\n  Test it: triplex health --profile {profile_name}");
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = triplex_config::load_config()?;
            let format = config::output_format(global, &cfg);
            let out = output::render_document(format, &redacted(&cfg));
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetSecret { kind, value } => {
            let cfg = triplex_config::load_config_or_default();
            let profile_name = cfg.profile_name(global.profile.as_deref()).to_owned();
            let kind = secret_kind(kind);

            let value = match value {
                Some(v) => v,
                None => rpassword::prompt_password(format!("{kind} for '{profile_name}': "))
                    .map_err(prompt_err)?,
            };
            if value.is_empty() {
                return Err(CliError::validation(kind.as_ref(), "secret cannot be empty"));
            }

            triplex_config::store_secret(&profile_name, kind, &value)?;
            if !global.quiet {
                eprintln!("✓ {kind} stored in keyring for profile '{profile_name}'");
            }
            Ok(())
        }
    }
}
