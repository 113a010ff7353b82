// Configuration loader
// Loads ~/clawd/config/escalation.toml (or the legacy JSON file), honouring
// ESCALATION_CONFIG and an explicit --config path

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::{default_workspace_dir, EscalationConfig};
use crate::errors::config_parse_error;

/// Environment variable that points at a config file
pub const CONFIG_ENV_VAR: &str = "ESCALATION_CONFIG";

/// Where to look for configuration, in priority order
pub fn config_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return vec![PathBuf::from(path)];
        }
    }

    let config_dir = default_workspace_dir().join("config");
    vec![
        config_dir.join("escalation.toml"),
        config_dir.join("escalation_config.json"),
    ]
}

/// Load configuration. A missing file means defaults; a broken one is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<EscalationConfig> {
    for path in config_candidates(explicit) {
        if path.exists() {
            let config = load_config_from(&path)?;
            tracing::debug!("Loaded escalation config from {}", path.display());
            return Ok(config);
        }
    }

    tracing::debug!("No escalation config found, using defaults");
    Ok(EscalationConfig::default())
}

/// Like `load_config`, but a broken file falls back to defaults with a warning
pub fn load_config_or_default(explicit: Option<&Path>) -> EscalationConfig {
    match load_config(explicit) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Could not load escalation config, using defaults: {:#}", e);
            EscalationConfig::default()
        }
    }
}

/// Parse one file; `.json` is JSON, anything else is TOML
pub fn load_config_from(path: &Path) -> Result<EscalationConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed: Result<EscalationConfig> = if is_json {
        serde_json::from_str(&contents).map_err(|e| anyhow!(e))
    } else {
        toml::from_str(&contents).map_err(|e| anyhow!(e))
    };

    let config = parsed
        .map_err(|e| anyhow!(config_parse_error(&path.display().to_string(), &e.to_string())))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    Ok(config)
}
