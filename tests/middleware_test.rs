// Middleware behavior tests
//
// The middleware must never lose a message: bypasses, model failures and
// deadline expiry all forward upstream.

use anyhow::Result;
use async_trait::async_trait;
use jarvis_escalation::analyzer::ComplexityScore;
use jarvis_escalation::config::EscalationConfig;
use jarvis_escalation::local::{LocalAnswerFailure, LocalResponder};
use jarvis_escalation::metrics::{DecisionLog, LedgerStore, SavingsCalculator};
use jarvis_escalation::middleware::{EscalationMiddleware, InterceptAction, PlatformMessage};
use jarvis_escalation::router::RoutingPolicy;
use jarvis_escalation::{EscalationEngine, QueryContext};
use std::time::Duration;
use tempfile::TempDir;

struct Notes;

#[async_trait]
impl LocalResponder for Notes {
    async fn respond(
        &self,
        _query: &str,
        _complexity: &ComplexityScore,
        _context: &QueryContext,
    ) -> Result<String, LocalAnswerFailure> {
        Ok("Nothing urgent in today's notes.".to_string())
    }

    fn name(&self) -> &str {
        "notes"
    }
}

struct Hanging;

#[async_trait]
impl LocalResponder for Hanging {
    async fn respond(
        &self,
        _query: &str,
        _complexity: &ComplexityScore,
        _context: &QueryContext,
    ) -> Result<String, LocalAnswerFailure> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("never".to_string())
    }

    fn name(&self) -> &str {
        "hanging"
    }
}

fn middleware(
    dir: &TempDir,
    policy: RoutingPolicy,
    responder: Box<dyn LocalResponder>,
) -> EscalationMiddleware {
    let config = EscalationConfig::with_workspace(dir.path());
    let engine = EscalationEngine::new(
        policy,
        responder,
        SavingsCalculator::default(),
        DecisionLog::new(config.log_path()),
        LedgerStore::new(config.ledger_path()),
    );
    EscalationMiddleware::new(engine, config)
}

fn log_len(dir: &TempDir) -> Result<usize> {
    let config = EscalationConfig::with_workspace(dir.path());
    Ok(DecisionLog::new(config.log_path()).read_all()?.count())
}

#[tokio::test]
async fn test_simple_message_answered_locally() -> Result<()> {
    let dir = TempDir::new()?;
    let mut middleware = middleware(&dir, RoutingPolicy::default(), Box::new(Notes));

    let outcome = middleware
        .intercept(&PlatformMessage::text("What time is it?").from_user("42"))
        .await;

    assert_eq!(outcome.action, InterceptAction::RespondLocal);
    assert_eq!(outcome.reason, "low_complexity");
    assert_eq!(
        outcome.response.as_deref(),
        Some("Nothing urgent in today's notes.")
    );
    assert_eq!(middleware.stats().local_queries, 1);
    assert_eq!(log_len(&dir)?, 1);
    Ok(())
}

#[tokio::test]
async fn test_complex_message_forwarded_with_decision() -> Result<()> {
    let dir = TempDir::new()?;
    let mut middleware = middleware(&dir, RoutingPolicy::default(), Box::new(Notes));

    let outcome = middleware
        .intercept(&PlatformMessage::text("Should I invest in Bitcoin or Tesla?"))
        .await;

    assert_eq!(outcome.action, InterceptAction::ForwardUpstream);
    assert_eq!(outcome.reason, "high_stakes");
    assert!(outcome.response.is_none());
    assert!(outcome.decision.is_some());
    assert_eq!(middleware.stats().cloud_queries, 1);
    Ok(())
}

#[tokio::test]
async fn test_bypassed_messages_are_not_logged() -> Result<()> {
    let dir = TempDir::new()?;
    let mut middleware = middleware(&dir, RoutingPolicy::default(), Box::new(Notes));

    let messages = [
        (PlatformMessage::text("/status"), "command"),
        (
            PlatformMessage {
                from_bot: true,
                ..PlatformMessage::text("What time is it?")
            },
            "from_bot",
        ),
        (
            PlatformMessage {
                has_media: true,
                ..PlatformMessage::text("What is this?")
            },
            "has_media",
        ),
        (PlatformMessage::text("  "), "empty_message"),
    ];

    for (message, reason) in messages {
        let outcome = middleware.intercept(&message).await;
        assert_eq!(outcome.action, InterceptAction::ForwardUpstream);
        assert_eq!(outcome.reason, reason);
        assert!(outcome.decision.is_none());
    }

    assert_eq!(log_len(&dir)?, 0);
    assert_eq!(middleware.stats().total_queries, 0);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_model_forwards_upstream() -> Result<()> {
    let dir = TempDir::new()?;
    let mut config = EscalationConfig::with_workspace(dir.path());
    // Nothing listens here
    config.local.base_url = "http://127.0.0.1:9".to_string();
    config.local.timeout_secs = 2;
    let mut middleware = EscalationMiddleware::from_config(config)?;

    // Routed local, but no template answers it and the model is down
    let outcome = middleware
        .intercept(&PlatformMessage::text("What's the weather like?"))
        .await;

    assert_eq!(outcome.action, InterceptAction::ForwardUpstream);
    assert_eq!(outcome.reason, "local_generation_failed");
    assert!(outcome.response.is_none());
    assert_eq!(middleware.stats().cloud_queries, 1);
    Ok(())
}

#[tokio::test]
async fn test_deadline_expiry_forwards_without_logging() -> Result<()> {
    let dir = TempDir::new()?;
    let policy = RoutingPolicy::new(Duration::from_secs(10), Duration::from_secs(5));
    let mut middleware = middleware(&dir, policy, Box::new(Hanging));

    let outcome = middleware
        .intercept_with_deadline(
            &PlatformMessage::text("What time is it?"),
            Duration::from_millis(50),
        )
        .await;

    assert_eq!(outcome.action, InterceptAction::ForwardUpstream);
    assert_eq!(outcome.reason, "routing_timeout");
    assert!(outcome.decision.is_none());
    assert_eq!(log_len(&dir)?, 0);
    assert_eq!(middleware.stats().total_queries, 0);
    Ok(())
}

#[tokio::test]
async fn test_outcome_json_shape() -> Result<()> {
    let dir = TempDir::new()?;
    let mut middleware = middleware(&dir, RoutingPolicy::default(), Box::new(Notes));

    let outcome = middleware
        .intercept(&PlatformMessage::text("What time is it?"))
        .await;
    let json = serde_json::to_value(&outcome)?;

    assert_eq!(json["action"], "respond_local");
    assert_eq!(json["reason"], "low_complexity");
    assert_eq!(json["decision"]["route"], "local");
    assert!(json["decision"]["complexity"]["overall"].is_u64());
    Ok(())
}
