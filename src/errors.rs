// Error taxonomy and user-friendly error messages
//
// Typed errors for the routing core, plus helpers that turn technical
// failures into actionable messages for the CLI.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the escalation core
#[derive(Debug, Error)]
pub enum EscalationError {
    /// Empty or whitespace-only query text
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A complexity field was outside [0, 100]
    #[error("invalid complexity score: {field} = {value} (expected 0-100)")]
    InvalidScore { field: &'static str, value: u32 },

    /// A decision record breaks its own invariants (e.g. savings on a cloud route)
    #[error("invalid routing decision: {0}")]
    InvalidDecision(String),

    /// Appending a decision to the decision log failed
    #[error("failed to append to decision log {}: {source}", .path.display())]
    LogWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The decision log exists but could not be opened
    #[error("failed to read decision log {}: {source}", .path.display())]
    LogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rewriting the savings ledger failed
    #[error("failed to write savings ledger {}: {source}", .path.display())]
    LedgerWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The savings ledger exists but could not be read or parsed
    #[error("failed to read savings ledger {}: {reason}", .path.display())]
    LedgerRead { path: PathBuf, reason: String },

    /// Catch-all for adapter-layer failures
    #[error("middleware error: {0}")]
    Middleware(String),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EscalationError {
    /// Persistence failures never block the response path
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            EscalationError::LogWrite { .. } | EscalationError::LedgerWrite { .. }
        )
    }
}

/// Format a config parse error with helpful suggestions
pub fn config_parse_error(path: &str, error: &str) -> String {
    format!(
        "Failed to parse config file {}\n\n\
        \x1b[1;33mError:\x1b[0m {}\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Check config file syntax:\n\
           \x1b[36mcat {}\x1b[0m\n\n\
        2. Remove the file to fall back to defaults (enabled, no overrides)\n\n\
        3. Common mistakes:\n\
           • per_user_overrides entries must be tables: {{ enabled = false }}\n\
           • chars_per_token must be a positive integer\n\
           • Missing quotes around strings",
        path, error, path
    )
}

/// Format a local model server error with helpful suggestions
pub fn local_model_unreachable_error(base_url: &str, model: &str) -> String {
    format!(
        "Could not reach local model server at {}\n\n\
        \x1b[1;33mPossible causes:\x1b[0m\n\
        • Ollama is not running\n\
        • Model '{}' has not been pulled\n\
        • Wrong base_url in config\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Start the server:\n\
           \x1b[36mollama serve\x1b[0m\n\n\
        2. Pull the model:\n\
           \x1b[36mollama pull {}\x1b[0m\n\n\
        Queries will be escalated to the cloud until the server is reachable.",
        base_url, model, model
    )
}

/// Format a persistence error with helpful suggestions
pub fn persistence_error(path: &str, operation: &str) -> String {
    format!(
        "Could not {} {}\n\n\
        \x1b[1;33mPossible causes:\x1b[0m\n\
        • Parent directory not writable\n\
        • Disk full\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Check permissions:\n\
           \x1b[36mls -la $(dirname \"{}\")\x1b[0m\n\n\
        2. Rebuild the ledger from the decision log once fixed:\n\
           \x1b[36mescalation --rebuild-ledger\x1b[0m",
        operation, path, path
    )
}

/// Wrap a generic error with a suggestion
pub fn wrap_error_with_suggestion(error: impl fmt::Display, suggestion: &str) -> String {
    format!(
        "{}\n\n\
        \x1b[1;33mSuggestion:\x1b[0m {}",
        error, suggestion
    )
}
