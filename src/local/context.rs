// Local data gathering for model prompts

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::router::QueryContext;

/// How much of today's memory note goes into a prompt
const MEMORY_EXCERPT_CHARS: usize = 500;

/// Data available on this machine that a local model may use to answer
#[derive(Debug, Clone, Serialize)]
pub struct LocalData {
    pub workspace: PathBuf,
    pub current_time: String,
    #[serde(skip_serializing_if = "QueryContext::is_empty")]
    pub context: QueryContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today_memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<serde_json::Value>,
}

impl LocalData {
    /// Collect whatever local data exists. Missing or unreadable files are skipped.
    pub fn gather(workspace: &Path, context: &QueryContext, now: DateTime<Local>) -> Self {
        let memory_file = workspace
            .join("memory")
            .join(format!("{}.md", now.format("%Y-%m-%d")));
        let today_memory = fs::read_to_string(&memory_file)
            .ok()
            .map(|text| text.chars().take(MEMORY_EXCERPT_CHARS).collect());

        let dashboard_file = workspace.join("data").join("dashboard.json");
        let dashboard = fs::read_to_string(&dashboard_file)
            .ok()
            .and_then(|text| match serde_json::from_str(&text) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!("Ignoring unparseable {}: {}", dashboard_file.display(), e);
                    None
                }
            });

        Self {
            workspace: workspace.to_path_buf(),
            current_time: now.to_rfc3339(),
            context: context.clone(),
            today_memory,
            dashboard,
        }
    }

    /// Pretty JSON for embedding in a prompt
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
