// Template responder - canned answers that need no model at all

use async_trait::async_trait;
use chrono::{DateTime, Local};

use super::{LocalAnswerFailure, LocalResponder};
use crate::analyzer::{ComplexityScore, NormalizedQuery};
use crate::router::QueryContext;

/// Answers greetings and clock/date questions from the system clock
#[derive(Debug, Clone, Default)]
pub struct TemplateResponder;

impl TemplateResponder {
    pub fn new() -> Self {
        Self
    }

    /// Answer at a fixed instant
    pub fn answer_at(&self, query: &str, now: DateTime<Local>) -> Option<String> {
        let q = NormalizedQuery::new(query);

        if q.word_count() <= 3
            && matches!(q.first_token(), Some("hi" | "hello" | "hey" | "morning"))
        {
            return Some("Hello! What can I do for you?".to_string());
        }
        if q.word_count() <= 3 && q.first_token() == Some("thanks") {
            return Some("You're welcome.".to_string());
        }
        if q.contains("what time") || q.contains("the time") {
            return Some(format!("It's {}.", now.format("%-I:%M %p")));
        }
        if q.contains("what day") || q.contains("today's date") || q.contains("what date") {
            return Some(format!("Today is {}.", now.format("%A, %B %-d, %Y")));
        }
        None
    }
}

#[async_trait]
impl LocalResponder for TemplateResponder {
    async fn respond(
        &self,
        query: &str,
        _complexity: &ComplexityScore,
        _context: &QueryContext,
    ) -> Result<String, LocalAnswerFailure> {
        self.answer_at(query, Local::now())
            .ok_or_else(|| LocalAnswerFailure::Declined("no template matches".to_string()))
    }

    fn name(&self) -> &str {
        "templates"
    }
}
