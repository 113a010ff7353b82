// Complexity analyzer
// Scores a query along six dimensions using curated term tables

mod score;
mod shape;
mod terms;

pub use score::{ComplexityBand, ComplexityScore};
pub use shape::QueryShape;
pub use terms::NormalizedQuery;

use crate::errors::EscalationError;
use terms::{
    DATA_TERMS, DECISION_TERMS, EXTERNAL_DATA_TERMS, IRREVERSIBLE_TERMS, LOCAL_DATA_TERMS,
    MULTI_STEP_TERMS, REASONING_TERMS, SCOPE_TERMS, TECHNICAL_TERMS, TIME_TERMS,
};

const REASONING_BASE: u32 = 10;
const LENGTH_BONUS_AFTER_WORDS: usize = 12;
const LENGTH_BONUS_PER_WORD: u32 = 2;
const LENGTH_BONUS_MAX: u32 = 20;

/// Reversibility of any query naming an irreversible action. At the
/// high-stakes threshold, so such a query never stays local.
pub const IRREVERSIBLE_BASE: u32 = 70;

const LOCAL_DATA_BONUS: u32 = 10;
const EXTERNAL_DATA_PENALTY: u32 = 35;
const LENGTH_PENALTY_AFTER_WORDS: usize = 20;
const LENGTH_PENALTY_MAX: u32 = 20;

/// Stateless, deterministic complexity analyzer
#[derive(Debug, Clone, Default)]
pub struct ComplexityAnalyzer;

impl ComplexityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Score a query. Pure function of the text.
    ///
    /// Empty or whitespace-only input is rejected with `InvalidQuery`
    /// rather than scored as zero.
    pub fn analyze(&self, query: &str) -> Result<ComplexityScore, EscalationError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(EscalationError::InvalidQuery(
                "query is empty or whitespace".to_string(),
            ));
        }

        let normalized = NormalizedQuery::new(trimmed);
        let shape = QueryShape::classify(&normalized);

        let score = ComplexityScore::from_dimensions(
            factual_vs_reasoning(&normalized),
            clamp(normalized.weigh(DATA_TERMS)),
            clamp(normalized.weigh(DECISION_TERMS)),
            clamp(normalized.weigh(TIME_TERMS)),
            reversibility(&normalized),
            confidence(&normalized, shape),
        )?;

        tracing::debug!(
            shape = shape.as_str(),
            overall = score.overall,
            confidence = score.confidence,
            "Scored query"
        );

        Ok(score)
    }

    /// Shape of a query, for display and diagnostics
    pub fn shape_of(&self, query: &str) -> QueryShape {
        QueryShape::classify(&NormalizedQuery::new(query.trim()))
    }
}

fn clamp(value: u32) -> u32 {
    value.min(score::MAX_SCORE)
}

fn factual_vs_reasoning(query: &NormalizedQuery) -> u32 {
    let extra_words = query.word_count().saturating_sub(LENGTH_BONUS_AFTER_WORDS) as u32;
    let length_bonus = (extra_words * LENGTH_BONUS_PER_WORD).min(LENGTH_BONUS_MAX);

    clamp(
        REASONING_BASE
            + query.weigh(REASONING_TERMS)
            + query.weigh(TECHNICAL_TERMS)
            + query.weigh(MULTI_STEP_TERMS)
            + length_bonus,
    )
}

/// Scope words only matter once something irreversible is on the table
fn reversibility(query: &NormalizedQuery) -> u32 {
    let verbs = query.weigh(IRREVERSIBLE_TERMS);
    if verbs == 0 {
        return 0;
    }
    clamp(IRREVERSIBLE_BASE + verbs + query.weigh(SCOPE_TERMS))
}

fn confidence(query: &NormalizedQuery, shape: QueryShape) -> u32 {
    let mut confidence = shape.baseline_confidence() as i64;

    if query.contains_any(LOCAL_DATA_TERMS) {
        confidence += LOCAL_DATA_BONUS as i64;
    }
    if query.contains_any(EXTERNAL_DATA_TERMS) {
        confidence -= EXTERNAL_DATA_PENALTY as i64;
    }

    let extra_words = query.word_count().saturating_sub(LENGTH_PENALTY_AFTER_WORDS) as i64;
    confidence -= extra_words.min(LENGTH_PENALTY_MAX as i64);

    confidence.clamp(0, score::MAX_SCORE as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(query: &str) -> ComplexityScore {
        ComplexityAnalyzer::new().analyze(query).unwrap()
    }

    #[test]
    fn test_empty_query_rejected() {
        let analyzer = ComplexityAnalyzer::new();
        assert!(matches!(
            analyzer.analyze(""),
            Err(EscalationError::InvalidQuery(_))
        ));
        assert!(matches!(
            analyzer.analyze("   \n\t"),
            Err(EscalationError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_simple_lookup_is_low_and_confident() {
        let score = analyze("What time is it?");
        assert_eq!(score.factual_vs_reasoning, 10);
        assert_eq!(score.data_retrieval, 0);
        assert_eq!(score.decision_making, 0);
        assert_eq!(score.time_sensitivity, 20);
        assert_eq!(score.reversibility, 0);
        assert_eq!(score.confidence, 90);
        assert_eq!(score.overall, 11);
    }

    #[test]
    fn test_refactor_is_irreversible() {
        let score = analyze("Refactor this entire codebase for performance");
        // base 70 + refactor 20 + entire 25 + codebase 25, clamped
        assert_eq!(score.reversibility, 100);
    }

    #[test]
    fn test_scope_without_verb_is_reversible() {
        let score = analyze("Show me the entire codebase layout");
        assert_eq!(score.reversibility, 0);
    }

    #[test]
    fn test_financial_decision() {
        let score = analyze("Should I invest in Bitcoin or Tesla?");
        assert_eq!(score.decision_making, 100);
        assert_eq!(score.confidence, 35);
    }

    #[test]
    fn test_architecture_is_high_complexity() {
        let score = analyze("Design a distributed system architecture");
        assert_eq!(score.factual_vs_reasoning, 75);
        assert_eq!(score.overall, 68);
        assert_eq!(score.confidence, 45);
    }

    #[test]
    fn test_medium_band_queries() {
        let summary = analyze("Summarize the last week of work");
        assert_eq!(summary.overall, 48);
        assert_eq!(summary.confidence, 75);

        let analysis = analyze("Analyze recent cost trends");
        assert_eq!(analysis.overall, 50);
        assert_eq!(analysis.confidence, 55);
    }

    #[test]
    fn test_external_data_lowers_confidence() {
        let weather = analyze("What's the weather like?");
        assert_eq!(weather.confidence, 55);

        let memory = analyze("Show me today's memory");
        assert_eq!(memory.confidence, 85);
    }

    #[test]
    fn test_long_queries_lose_confidence() {
        let long = "tell me something about the garden and the house and the car and the \
                    street and the town and the city and the country please";
        let score = analyze(long);
        assert!(score.confidence < QueryShape::Other.baseline_confidence());
        assert!(score.factual_vs_reasoning > REASONING_BASE);
    }

    #[test]
    fn test_determinism() {
        let analyzer = ComplexityAnalyzer::new();
        for query in [
            "What time is it?",
            "Deploy the whole thing to production right now",
            "Why is the sky blue?",
        ] {
            assert_eq!(analyzer.analyze(query).unwrap(), analyzer.analyze(query).unwrap());
        }
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        assert_eq!(analyze("  What time is it?  "), analyze("What time is it?"));
    }
}
