// Query shape classification
//
// Shapes group queries by how well a small local model historically answers
// them. Each shape carries a baseline confidence.

use serde::{Deserialize, Serialize};

use super::terms::NormalizedQuery;

/// Coarse query shape used to seed local-model confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryShape {
    Greeting,    // "hi", "hello"
    Lookup,      // "what time is it", "who is X"
    Summary,     // "summarize X", "show me X"
    Explanation, // "explain X", "why X"
    HowTo,       // "how to X", "how do I X"
    Comparison,  // "X vs Y", "difference between"
    Analysis,    // "analyze X", "trends"
    Code,        // contains code
    Debugging,   // "error", "fix", "bug"
    Creative,    // "write", "design", "plan"
    Opinion,     // "should I", "recommend"
    Other,
}

impl QueryShape {
    /// Baseline confidence that the local responder answers this shape well
    pub fn baseline_confidence(&self) -> u32 {
        match self {
            QueryShape::Greeting => 95,
            QueryShape::Lookup => 90,
            QueryShape::Summary => 75,
            QueryShape::Explanation => 75,
            QueryShape::HowTo => 70,
            QueryShape::Comparison => 70,
            QueryShape::Other => 65,
            QueryShape::Analysis => 55,
            QueryShape::Code => 45,
            QueryShape::Debugging => 45,
            QueryShape::Creative => 45,
            QueryShape::Opinion => 35,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryShape::Greeting => "greeting",
            QueryShape::Lookup => "lookup",
            QueryShape::Summary => "summary",
            QueryShape::Explanation => "explanation",
            QueryShape::HowTo => "how_to",
            QueryShape::Comparison => "comparison",
            QueryShape::Analysis => "analysis",
            QueryShape::Code => "code",
            QueryShape::Debugging => "debugging",
            QueryShape::Creative => "creative",
            QueryShape::Opinion => "opinion",
            QueryShape::Other => "other",
        }
    }

    /// Classify a query. Checks run from most to least specific.
    pub fn classify(query: &NormalizedQuery) -> Self {
        let raw = query.raw();

        if raw.contains("```") || raw.contains("fn ") || raw.contains("def ") {
            return QueryShape::Code;
        }

        if query.contains_any(&["error", "bug", "fix", "broken", "crash", "doesn't work"]) {
            return QueryShape::Debugging;
        }

        if query.word_count() <= 3 {
            if let Some(first) = query.first_token() {
                if matches!(first, "hi" | "hello" | "hey" | "thanks" | "morning")
                    || query.contains("good morning")
                {
                    return QueryShape::Greeting;
                }
            }
        }

        if query.contains_any(&[
            "should i",
            "should we",
            "is it better",
            "recommend",
            "worth it",
            "what do you think",
        ]) {
            return QueryShape::Opinion;
        }

        if query.contains_any(&[
            "write",
            "draft",
            "compose",
            "design",
            "create",
            "brainstorm",
            "story",
            "poem",
            "plan",
        ]) {
            return QueryShape::Creative;
        }

        if query.contains_any(&["summar", "recap", "show me", "list"]) {
            return QueryShape::Summary;
        }

        if query.contains_any(&["analy", "trend", "evaluate", "assess", "investigate"]) {
            return QueryShape::Analysis;
        }

        if query.contains_any(&["vs", "versus", "difference between", "compare"]) {
            return QueryShape::Comparison;
        }

        if query.contains_any(&["explain", "describe", "how does"])
            || query.first_token() == Some("why")
        {
            return QueryShape::Explanation;
        }

        if query.contains_any(&["how to", "how do", "how can"]) {
            return QueryShape::HowTo;
        }

        if let Some(first) = query.first_token() {
            if matches!(
                first,
                "what" | "what's" | "who" | "who's" | "when" | "where" | "which" | "define"
            ) {
                return QueryShape::Lookup;
            }
        }

        QueryShape::Other
    }
}
