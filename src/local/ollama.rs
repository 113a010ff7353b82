// Ollama responder - answers through a locally hosted model server

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::{screen_reply, LocalAnswerFailure, LocalData, LocalResponder, ESCALATE_SENTINEL};
use crate::analyzer::ComplexityScore;
use crate::router::QueryContext;

/// Transport-level ceiling; the engine applies a tighter per-query budget
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    system: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Local model served by Ollama's `/api/generate`
#[derive(Clone)]
pub struct OllamaResponder {
    client: Client,
    base_url: String,
    model: String,
    workspace: PathBuf,
}

impl OllamaResponder {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        workspace: impl Into<PathBuf>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            workspace: workspace.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn system_prompt() -> String {
        format!(
            "You are Jarvis, a personal assistant. Answer queries using the available local data.\n\
             Be concise, accurate, and helpful. If you're unsure, say so clearly.\n\
             If the query requires external data or reasoning beyond your capability, \
             reply with exactly: {}",
            ESCALATE_SENTINEL
        )
    }

    fn user_prompt(query: &str, context: &QueryContext, data: &LocalData) -> String {
        let mut prompt = format!("Query: {}\n\n", query);
        if !context.is_empty() {
            prompt.push_str(&format!("Context:\n{}\n\n", context.describe()));
        }
        prompt.push_str(&format!(
            "Available data:\n{}\n\nRespond directly to the query. Be brief and accurate.",
            data.to_prompt_json()
        ));
        prompt
    }
}

#[async_trait]
impl LocalResponder for OllamaResponder {
    async fn respond(
        &self,
        query: &str,
        _complexity: &ComplexityScore,
        context: &QueryContext,
    ) -> Result<String, LocalAnswerFailure> {
        let data = LocalData::gather(&self.workspace, context, Local::now());
        let request = GenerateRequest {
            model: &self.model,
            prompt: Self::user_prompt(query, context, &data),
            system: Self::system_prompt(),
            stream: false,
        };

        tracing::debug!("Sending generate request to {} ({})", self.base_url, self.model);

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| LocalAnswerFailure::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LocalAnswerFailure::Unavailable(format!(
                "status {}: {}",
                status,
                body.trim()
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LocalAnswerFailure::Unavailable(format!("bad response body: {}", e)))?;

        screen_reply(&parsed.response)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let responder =
            OllamaResponder::new("http://localhost:11434/", "llama3.1:8b", "/tmp").unwrap();
        assert_eq!(responder.base_url(), "http://localhost:11434");
        assert_eq!(responder.model(), "llama3.1:8b");
    }

    #[test]
    fn test_prompts_mention_sentinel_and_query() {
        assert!(OllamaResponder::system_prompt().contains(ESCALATE_SENTINEL));

        let data = LocalData::gather(
            std::path::Path::new("/nonexistent"),
            &QueryContext::default(),
            Local::now(),
        );
        let prompt = OllamaResponder::user_prompt("What time is it?", &QueryContext::default(), &data);
        assert!(prompt.starts_with("Query: What time is it?"));
        assert!(prompt.contains("current_time"));
        assert!(!prompt.contains("Context:"));
    }

    #[test]
    fn test_prompt_carries_message_context() {
        let context = QueryContext::default().with_user("42");
        let data = LocalData::gather(std::path::Path::new("/nonexistent"), &context, Local::now());
        let prompt = OllamaResponder::user_prompt("What time is it?", &context, &data);
        assert!(prompt.contains("Context:\nuser_id: 42\n"));
    }
}
