// Responder chain - try local responders in priority order

use async_trait::async_trait;

use super::{LocalAnswerFailure, LocalResponder};
use crate::analyzer::ComplexityScore;
use crate::router::QueryContext;

/// Local responders to try in order; the first answer wins
pub struct ResponderChain {
    responders: Vec<Box<dyn LocalResponder>>,
}

impl ResponderChain {
    /// Create a chain with responders in priority order
    pub fn new(responders: Vec<Box<dyn LocalResponder>>) -> Self {
        Self { responders }
    }

    pub fn len(&self) -> usize {
        self.responders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responders.is_empty()
    }
}

#[async_trait]
impl LocalResponder for ResponderChain {
    async fn respond(
        &self,
        query: &str,
        complexity: &ComplexityScore,
        context: &QueryContext,
    ) -> Result<String, LocalAnswerFailure> {
        let mut last_failure =
            LocalAnswerFailure::Unavailable("no local responders configured".to_string());

        for (idx, responder) in self.responders.iter().enumerate() {
            match responder.respond(query, complexity, context).await {
                Ok(answer) => {
                    if idx > 0 {
                        tracing::debug!(
                            "Responder {} answered after {} declined",
                            responder.name(),
                            idx
                        );
                    }
                    return Ok(answer);
                }
                Err(failure) => {
                    tracing::debug!(
                        "Responder {} failed ({}/{}): {}",
                        responder.name(),
                        idx + 1,
                        self.responders.len(),
                        failure
                    );
                    last_failure = failure;
                }
            }
        }

        Err(last_failure)
    }

    fn name(&self) -> &str {
        "chain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<String, LocalAnswerFailure>);

    #[async_trait]
    impl LocalResponder for Fixed {
        async fn respond(
            &self,
            _query: &str,
            _complexity: &ComplexityScore,
            _context: &QueryContext,
        ) -> Result<String, LocalAnswerFailure> {
            self.0.clone()
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn score() -> ComplexityScore {
        ComplexityScore::from_dimensions(10, 0, 0, 0, 0, 90).unwrap()
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let chain = ResponderChain::new(vec![
            Box::new(Fixed(Err(LocalAnswerFailure::Empty))),
            Box::new(Fixed(Ok("second".to_string()))),
            Box::new(Fixed(Ok("third".to_string()))),
        ]);
        let answer = chain
            .respond("hi", &score(), &QueryContext::default())
            .await;
        assert_eq!(answer.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_all_fail_returns_last_failure() {
        let chain = ResponderChain::new(vec![
            Box::new(Fixed(Err(LocalAnswerFailure::Empty))),
            Box::new(Fixed(Err(LocalAnswerFailure::Declined("no".to_string())))),
        ]);
        let answer = chain
            .respond("hi", &score(), &QueryContext::default())
            .await;
        assert_eq!(answer, Err(LocalAnswerFailure::Declined("no".to_string())));
    }

    #[tokio::test]
    async fn test_empty_chain_is_unavailable() {
        let chain = ResponderChain::new(Vec::new());
        assert!(chain.is_empty());
        let answer = chain
            .respond("hi", &score(), &QueryContext::default())
            .await;
        assert!(matches!(answer, Err(LocalAnswerFailure::Unavailable(_))));
    }
}
