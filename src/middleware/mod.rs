// Middleware adapter
//
// Sits in front of a chat platform handler: decides per inbound message
// whether to reply with a local answer or forward upstream as usual.
// Every failure path forwards upstream; a message is never dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EscalationConfig;
use crate::errors::EscalationError;
use crate::metrics::SavingsLedger;
use crate::router::{EscalationEngine, QueryContext, Route, RoutingDecision};

/// Messages starting with this go straight to the main agent
pub const COMMAND_PREFIX: char = '/';

/// Inbound chat message as the platform hands it over
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformMessage {
    pub text: String,
    pub user_id: Option<String>,
    pub chat_type: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub message_id: Option<String>,
    pub reply_to: Option<String>,
    pub from_bot: bool,
    pub has_media: bool,
    pub has_file: bool,
}

impl PlatformMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn from_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// What the platform handler should do with the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterceptAction {
    RespondLocal,
    ForwardUpstream,
}

/// Result of intercepting one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterceptOutcome {
    pub action: InterceptAction,
    /// Reason code, bypass reason, or `middleware_error: ...`
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<RoutingDecision>,
}

impl InterceptOutcome {
    fn forward(reason: impl Into<String>, decision: Option<RoutingDecision>) -> Self {
        Self {
            action: InterceptAction::ForwardUpstream,
            reason: reason.into(),
            response: None,
            decision,
        }
    }

    pub fn is_local(&self) -> bool {
        self.action == InterceptAction::RespondLocal
    }
}

/// Platform-facing wrapper around the escalation engine
pub struct EscalationMiddleware {
    engine: EscalationEngine,
    config: EscalationConfig,
    platform: String,
}

impl EscalationMiddleware {
    /// Enable/disable settings are read from `config` once, here
    pub fn new(engine: EscalationEngine, config: EscalationConfig) -> Self {
        Self {
            engine,
            config,
            platform: "telegram".to_string(),
        }
    }

    pub fn from_config(config: EscalationConfig) -> Result<Self, EscalationError> {
        let engine = EscalationEngine::from_config(&config)
            .map_err(|e| EscalationError::Middleware(format!("{:#}", e)))?;
        Ok(Self::new(engine, config))
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Why a message skips routing entirely, if it does
    pub fn bypass_reason(&self, message: &PlatformMessage) -> Option<&'static str> {
        let user_id = message.user_id.as_deref();
        if !self.config.enabled_for(user_id) {
            let has_override =
                user_id.is_some_and(|id| self.config.per_user_overrides.contains_key(id));
            return Some(if has_override {
                "user_disabled"
            } else {
                "escalation_disabled"
            });
        }
        if message.from_bot {
            return Some("from_bot");
        }
        if message.has_media || message.has_file {
            return Some("has_media");
        }
        let text = message.text.trim();
        if text.starts_with(COMMAND_PREFIX) {
            return Some("command");
        }
        if text.is_empty() {
            return Some("empty_message");
        }
        None
    }

    fn build_context(&self, message: &PlatformMessage) -> QueryContext {
        QueryContext {
            user_id: message.user_id.clone(),
            chat_type: Some(
                message
                    .chat_type
                    .clone()
                    .unwrap_or_else(|| "private".to_string()),
            ),
            timestamp: message.timestamp,
            message_id: message.message_id.clone(),
            reply_to: message.reply_to.clone(),
            ..QueryContext::default()
        }
        .with_extra("platform", serde_json::json!(self.platform))
        .with_extra("has_reply", serde_json::json!(message.reply_to.is_some()))
    }

    /// Route one message
    pub async fn intercept(&mut self, message: &PlatformMessage) -> InterceptOutcome {
        if let Some(reason) = self.bypass_reason(message) {
            tracing::debug!("Bypassing escalation: {}", reason);
            return InterceptOutcome::forward(reason, None);
        }

        let context = self.build_context(message);
        match self.engine.route_query(&message.text, &context).await {
            Ok(decision) => match (decision.route, decision.local_response.clone()) {
                (Route::Local, Some(response)) => InterceptOutcome {
                    action: InterceptAction::RespondLocal,
                    reason: decision.reason.as_str().to_string(),
                    response: Some(response),
                    decision: Some(decision),
                },
                _ => InterceptOutcome::forward(decision.reason.as_str(), Some(decision)),
            },
            Err(e) => {
                tracing::warn!("Escalation middleware error, forwarding upstream: {}", e);
                InterceptOutcome::forward(format!("middleware_error: {}", e), None)
            }
        }
    }

    /// Route one message within `deadline`.
    ///
    /// On expiry the in-flight routing is dropped, nothing is logged, and the
    /// message is forwarded upstream.
    pub async fn intercept_with_deadline(
        &mut self,
        message: &PlatformMessage,
        deadline: Duration,
    ) -> InterceptOutcome {
        match tokio::time::timeout(deadline, self.intercept(message)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    "Routing exceeded {}ms, forwarding upstream",
                    deadline.as_millis()
                );
                InterceptOutcome::forward("routing_timeout", None)
            }
        }
    }

    /// Lifetime savings totals
    pub fn stats(&self) -> &SavingsLedger {
        self.engine.stats()
    }

    pub fn engine(&self) -> &EscalationEngine {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserOverride;

    #[test]
    fn test_message_defaults() {
        let message: PlatformMessage = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(message.text, "hi");
        assert!(!message.from_bot);
        assert!(message.user_id.is_none());
    }

    #[test]
    fn test_action_serialization() {
        let outcome = InterceptOutcome::forward("command", None);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["action"], "forward_upstream");
        assert_eq!(json["reason"], "command");
        assert!(json.get("decision").is_none());
        assert_eq!(
            serde_json::to_string(&InterceptAction::RespondLocal).unwrap(),
            "\"respond_local\""
        );
    }

    #[test]
    fn test_bypass_reasons() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = EscalationConfig::with_workspace(dir.path());
        config
            .per_user_overrides
            .insert("mallory".to_string(), UserOverride { enabled: false });
        let engine = EscalationEngine::from_config(&config).unwrap();
        let middleware = EscalationMiddleware::new(engine, config);

        let bypass = |m: PlatformMessage| middleware.bypass_reason(&m);
        assert_eq!(bypass(PlatformMessage::text("hello")), None);
        assert_eq!(
            bypass(PlatformMessage::text("hello").from_user("mallory")),
            Some("user_disabled")
        );
        assert_eq!(
            bypass(PlatformMessage {
                from_bot: true,
                ..PlatformMessage::text("hello")
            }),
            Some("from_bot")
        );
        assert_eq!(
            bypass(PlatformMessage {
                has_file: true,
                ..PlatformMessage::text("hello")
            }),
            Some("has_media")
        );
        assert_eq!(bypass(PlatformMessage::text("/start")), Some("command"));
        assert_eq!(bypass(PlatformMessage::text("   ")), Some("empty_message"));
    }

    #[test]
    fn test_globally_disabled() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = EscalationConfig::with_workspace(dir.path());
        config.enabled = false;
        let engine = EscalationEngine::from_config(&config).unwrap();
        let middleware = EscalationMiddleware::new(engine, config);

        assert_eq!(
            middleware.bypass_reason(&PlatformMessage::text("hello").from_user("bob")),
            Some("escalation_disabled")
        );
    }

    #[test]
    fn test_context_carries_platform_fields() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = EscalationConfig::with_workspace(dir.path());
        let engine = EscalationEngine::from_config(&config).unwrap();
        let middleware = EscalationMiddleware::new(engine, config).with_platform("discord");

        let message = PlatformMessage {
            reply_to: Some("99".to_string()),
            ..PlatformMessage::text("hi").from_user("7")
        };
        let context = middleware.build_context(&message);
        assert_eq!(context.user_id.as_deref(), Some("7"));
        assert_eq!(context.chat_type.as_deref(), Some("private"));
        assert_eq!(context.extra["platform"], "discord");
        assert_eq!(context.extra["has_reply"], true);
    }
}
