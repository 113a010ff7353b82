// Configuration structs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::EscalationError;
use crate::metrics::Pricing;

/// Top-level escalation configuration. Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// Global switch; when false every message is forwarded upstream unscored
    pub enabled: bool,

    /// Per-user enable/disable, keyed by platform user id
    #[serde(alias = "user_overrides")]
    pub per_user_overrides: HashMap<String, UserOverride>,

    /// Root of the assistant workspace (memory notes, dashboard data)
    pub workspace_dir: PathBuf,

    /// Decision log location (default: `<workspace>/memory/escalation.log`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Ledger location (default: `<workspace>/memory/escalation_cost_savings.json`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ledger_path: Option<PathBuf>,

    pub local: LocalModelConfig,

    pub pricing: Pricing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOverride {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Local model server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalModelConfig {
    pub base_url: String,
    pub model: String,
    /// Upper bound on local generation
    pub timeout_secs: u64,
    /// Floor for the urgency-shortened budget
    pub min_timeout_ms: u64,
}

fn default_true() -> bool {
    true
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            per_user_overrides: HashMap::new(),
            workspace_dir: default_workspace_dir(),
            log_path: None,
            ledger_path: None,
            local: LocalModelConfig::default(),
            pricing: Pricing::default(),
        }
    }
}

impl Default for LocalModelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            timeout_secs: 8,
            min_timeout_ms: 1000,
        }
    }
}

impl LocalModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn min_timeout(&self) -> Duration {
        Duration::from_millis(self.min_timeout_ms)
    }
}

/// `~/clawd`, or `./clawd` when there is no home directory
pub fn default_workspace_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clawd")
}

impl EscalationConfig {
    /// Config rooted at a specific workspace
    pub fn with_workspace(workspace_dir: impl Into<PathBuf>) -> Self {
        Self {
            workspace_dir: workspace_dir.into(),
            ..Self::default()
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_path
            .clone()
            .unwrap_or_else(|| self.workspace_dir.join("memory").join("escalation.log"))
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.ledger_path.clone().unwrap_or_else(|| {
            self.workspace_dir
                .join("memory")
                .join("escalation_cost_savings.json")
        })
    }

    /// Is routing enabled for this user? Overrides win over the global switch.
    pub fn enabled_for(&self, user_id: Option<&str>) -> bool {
        user_id
            .and_then(|id| self.per_user_overrides.get(id))
            .map_or(self.enabled, |o| o.enabled)
    }

    /// Reject values that would make routing or accounting meaningless
    pub fn validate(&self) -> Result<(), EscalationError> {
        if self.pricing.chars_per_token == 0 {
            return Err(EscalationError::Config(
                "pricing.chars_per_token must be positive".to_string(),
            ));
        }
        for (key, price) in [
            ("pricing.input_per_million", self.pricing.input_per_million),
            ("pricing.output_per_million", self.pricing.output_per_million),
        ] {
            if !price.is_finite() || price < 0.0 {
                return Err(EscalationError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    key, price
                )));
            }
        }
        if self.local.timeout_secs == 0 {
            return Err(EscalationError::Config(
                "local.timeout_secs must be positive".to_string(),
            ));
        }
        if self.local.min_timeout_ms == 0 {
            return Err(EscalationError::Config(
                "local.min_timeout_ms must be positive".to_string(),
            ));
        }
        if self.local.base_url.trim().is_empty() {
            return Err(EscalationError::Config(
                "local.base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
