//! CLI-specific config helpers.
//!
//! Delegates loading to `apiradius-config` and layers `GlobalOpts` flag
//! overrides on top. Flags win over environment, environment over file.

use std::path::PathBuf;

use apiradius_config::Config;
use apiradius_core::ProviderConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Config file in effect: `--config` or the platform default.
pub fn effective_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(apiradius_config::config_path)
}

/// Load file + environment, then apply flag overrides.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = apiradius_config::load_config_from(&effective_path(global))?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

/// Build a validated `ProviderConfig` for commands that talk to the API.
pub fn provider_config(global: &GlobalOpts) -> Result<ProviderConfig, CliError> {
    let cfg = load(global)?;
    cfg.to_provider_config().map_err(|err| match err {
        apiradius_config::ConfigError::Missing { field, env } => CliError::NoConfig {
            field,
            env,
            path: effective_path(global).display().to_string(),
        },
        other => other.into(),
    })
}

fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref uri) = global.uri {
        cfg.uri = Some(uri.clone());
    }
    if let Some(ref operator) = global.operator {
        cfg.operator = Some(operator.clone());
    }
    if global.insecure {
        cfg.insecure = true;
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    if let Some(rate) = global.rate_limit {
        cfg.rate_limit = Some(rate);
    }
    if global.debug {
        cfg.debug = true;
    }
}
