// Local response generation
//
// Answers queries the router classified as local, using only resources on
// this machine. Responders never touch the decision log; the engine owns
// persistence.

mod chain;
mod context;
mod ollama;
mod templates;

pub use chain::ResponderChain;
pub use context::LocalData;
pub use ollama::OllamaResponder;
pub use templates::TemplateResponder;

use async_trait::async_trait;
use thiserror::Error;

use crate::analyzer::ComplexityScore;
use crate::router::QueryContext;

/// Marker a local model emits when it knows it cannot answer well
pub const ESCALATE_SENTINEL: &str = "ESCALATE_NEEDED";

/// Why a local responder produced no answer.
///
/// Never shown to the end user: the engine re-routes to cloud instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocalAnswerFailure {
    /// Model server unreachable or returned an error
    #[error("local model unavailable: {0}")]
    Unavailable(String),

    /// Generation exceeded its time budget
    #[error("local generation timed out after {after_ms}ms")]
    TimedOut { after_ms: u64 },

    /// The responder judged its own answer not good enough
    #[error("local responder declined: {0}")]
    Declined(String),

    /// The model replied with nothing
    #[error("local model returned an empty response")]
    Empty,
}

/// Something that can answer a query locally
#[async_trait]
pub trait LocalResponder: Send + Sync {
    /// Produce an answer, or explain why not
    async fn respond(
        &self,
        query: &str,
        complexity: &ComplexityScore,
        context: &QueryContext,
    ) -> Result<String, LocalAnswerFailure>;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Trim a model reply and apply the sentinel and empty checks
pub(crate) fn screen_reply(reply: &str) -> Result<String, LocalAnswerFailure> {
    if reply.contains(ESCALATE_SENTINEL) {
        return Err(LocalAnswerFailure::Declined(
            "model asked for escalation".to_string(),
        ));
    }
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Err(LocalAnswerFailure::Empty);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_reply() {
        assert_eq!(screen_reply("  hello \n").unwrap(), "hello");
        assert_eq!(screen_reply("   "), Err(LocalAnswerFailure::Empty));
        assert!(matches!(
            screen_reply("I can't. ESCALATE_NEEDED"),
            Err(LocalAnswerFailure::Declined(_))
        ));
    }

    #[test]
    fn test_failure_messages() {
        let failure = LocalAnswerFailure::TimedOut { after_ms: 1500 };
        assert_eq!(failure.to_string(), "local generation timed out after 1500ms");
    }
}
