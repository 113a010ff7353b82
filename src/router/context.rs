// Query context - optional platform metadata carried alongside a query

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Optional metadata about where a query came from.
///
/// Nothing here is required for routing; the analyzer only looks at text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    /// Anything else the platform wants to pass through
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Render as `key: value` lines for a model prompt
    pub fn describe(&self) -> String {
        let mut lines = Vec::new();
        if let Some(user) = &self.user_id {
            lines.push(format!("user_id: {}", user));
        }
        if let Some(chat_type) = &self.chat_type {
            lines.push(format!("chat_type: {}", chat_type));
        }
        if let Some(ts) = &self.timestamp {
            lines.push(format!("timestamp: {}", ts.to_rfc3339()));
        }
        if let Some(reply_to) = &self.reply_to {
            lines.push(format!("reply_to: {}", reply_to));
        }
        for (key, value) in &self.extra {
            lines.push(format!("{}: {}", key, value));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert!(QueryContext::new().is_empty());
        assert!(!QueryContext::new().with_user("42").is_empty());
    }

    #[test]
    fn test_describe() {
        let ctx = QueryContext::new()
            .with_user("42")
            .with_extra("source", serde_json::json!("telegram"));
        assert_eq!(ctx.describe(), "user_id: 42\nsource: \"telegram\"");
    }

    #[test]
    fn test_empty_fields_skipped_in_json() {
        let json = serde_json::to_string(&QueryContext::new().with_user("7")).unwrap();
        assert_eq!(json, r#"{"user_id":"7"}"#);
    }
}
