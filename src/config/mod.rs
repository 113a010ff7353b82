// Configuration module
// Public interface for configuration loading

mod loader;
mod settings;

pub use loader::{
    config_candidates, load_config, load_config_from, load_config_or_default, CONFIG_ENV_VAR,
};
pub use settings::{default_workspace_dir, EscalationConfig, LocalModelConfig, UserOverride};
