// Curated term tables for the complexity heuristics
//
// Single-word entries match as token prefixes ("deploy" matches "deploying").
// A trailing `$` pins a single word to the exact token ("pay$" skips "payload").
// Entries containing a space match as whole-word phrases.

use once_cell::sync::Lazy;
use regex::Regex;

/// Tokens are runs of lowercase alphanumerics and apostrophes
static TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9']+").expect("Failed to compile token regex"));

/// A term and the points it contributes when present
pub type Term = (&'static str, u32);

/// Lowercased, tokenized view of a query
#[derive(Debug, Clone)]
pub struct NormalizedQuery {
    tokens: Vec<String>,
    /// Tokens joined with single spaces and padded, for phrase lookup
    padded: String,
    raw: String,
}

impl NormalizedQuery {
    pub fn new(text: &str) -> Self {
        let lower = text.to_lowercase();
        let tokens: Vec<String> = TOKEN_REGEX
            .find_iter(&lower)
            .map(|m| m.as_str().trim_matches('\'').to_string())
            .filter(|t| !t.is_empty())
            .collect();
        let padded = format!(" {} ", tokens.join(" "));

        Self {
            tokens,
            padded,
            raw: text.to_string(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn word_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn first_token(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Original text, case preserved
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Does the query contain this term (stem, exact word or phrase)?
    pub fn contains(&self, term: &str) -> bool {
        if let Some(word) = term.strip_suffix('$') {
            self.tokens.iter().any(|t| t == word)
        } else if term.contains(' ') {
            self.padded.contains(&format!(" {} ", term))
        } else {
            self.tokens.iter().any(|t| t.starts_with(term))
        }
    }

    pub fn contains_any(&self, terms: &[&str]) -> bool {
        terms.iter().any(|t| self.contains(t))
    }

    /// Sum of the weights of every distinct matched term
    pub fn weigh(&self, terms: &[Term]) -> u32 {
        terms
            .iter()
            .filter(|(term, _)| self.contains(term))
            .map(|(_, weight)| weight)
            .sum()
    }
}

pub const REASONING_TERMS: &[Term] = &[
    ("explain", 25),
    ("why", 25),
    ("analy", 25),
    ("compare", 25),
    ("difference", 25),
    ("design", 25),
    ("architect", 25),
    ("strateg", 25),
    ("plan", 25),
    ("evaluate", 25),
    ("summar", 25),
    ("optimi", 25),
    ("tradeoff", 25),
    ("implement", 25),
    ("refactor", 25),
    ("write", 25),
    ("debug", 25),
    ("pros and cons", 25),
    ("how does", 15),
];

pub const TECHNICAL_TERMS: &[Term] = &[
    ("distributed", 15),
    ("scalab", 15),
    ("concurren", 15),
    ("algorithm", 15),
    ("infrastructure", 15),
    ("performance", 15),
    ("protocol", 15),
    ("microservice", 15),
    ("codebase", 15),
    ("kubernetes", 15),
];

pub const MULTI_STEP_TERMS: &[Term] = &[
    ("step", 10),
    ("then", 10),
    ("first", 10),
    ("finally", 10),
    ("after that", 10),
];

pub const DATA_TERMS: &[Term] = &[
    ("data", 20),
    ("memory", 20),
    ("logs", 20),
    ("report", 20),
    ("history", 20),
    ("record", 20),
    ("file", 20),
    ("trend", 20),
    ("cost", 20),
    ("week", 20),
    ("last", 20),
    ("recent", 20),
    ("today", 20),
    ("yesterday", 20),
    ("weather", 20),
    ("calendar", 20),
    ("email", 20),
    ("inbox", 20),
    ("stock", 20),
    ("price", 20),
    ("metric", 20),
    ("dashboard", 20),
    ("schedule", 20),
    ("summar", 15),
    ("show me", 15),
];

pub const DECISION_TERMS: &[Term] = &[
    ("should i", 45),
    ("should we", 45),
    ("decide", 35),
    ("decision", 35),
    ("invest$", 40),
    ("investing", 40),
    ("investment", 40),
    ("buy", 30),
    ("sell", 30),
    ("choose", 30),
    ("choice", 30),
    ("hire", 30),
    ("recommend", 25),
    ("better", 20),
    ("worth", 20),
    ("bitcoin", 20),
    ("ethereum", 20),
    ("crypto", 20),
    ("tesla", 20),
    ("portfolio", 20),
    ("strateg", 20),
    ("prioriti", 15),
    ("focus on", 10),
];

pub const TIME_TERMS: &[Term] = &[
    ("urgent", 50),
    ("asap", 50),
    ("emergency", 50),
    ("immediately", 45),
    ("right now", 40),
    ("deadline", 30),
    ("now", 25),
    ("today", 25),
    ("tonight", 25),
    ("time", 20),
    ("tomorrow", 20),
    ("soon", 15),
    ("quick", 10),
];

/// Irreversible actions. Any match puts reversibility at
/// `IRREVERSIBLE_BASE`; the weight here is severity on top of that.
pub const IRREVERSIBLE_TERMS: &[Term] = &[
    ("rm rf", 30),
    ("force push", 25),
    ("wipe", 25),
    ("destroy", 25),
    ("delete", 20),
    ("deploy", 20),
    ("refactor", 20),
    ("overwrite", 20),
    ("migrate", 15),
    ("rewrite", 15),
    ("publish", 15),
    ("transfer", 15),
    ("pay$", 15),
    ("paying", 15),
    ("purchase", 15),
    ("remove", 10),
    ("drop$", 10),
    ("dropping", 10),
    ("invest$", 10),
    ("investing", 10),
    ("send", 5),
    ("cancel", 5),
];

/// Widen the blast radius of an irreversible verb
pub const SCOPE_TERMS: &[Term] = &[
    ("entire", 25),
    ("everything", 25),
    ("codebase", 25),
    ("production", 30),
    ("whole", 20),
    ("database", 20),
];

/// Sources the local responder can read itself
pub const LOCAL_DATA_TERMS: &[&str] = &["memory", "note", "dashboard", "journal", "todo"];

/// Live data only reachable through external services
pub const EXTERNAL_DATA_TERMS: &[&str] = &[
    "weather", "forecast", "stock", "price", "news", "email", "inbox", "search", "latest",
    "online", "website", "look up",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenization() {
        let q = NormalizedQuery::new("What's the weather, today?");
        assert_eq!(q.tokens(), &["what's", "the", "weather", "today"]);
        assert_eq!(q.word_count(), 4);
    }

    #[test]
    fn test_stem_matching() {
        let q = NormalizedQuery::new("We are deploying tonight");
        assert!(q.contains("deploy"));
        assert!(!q.contains("delete"));
    }

    #[test]
    fn test_phrase_matching_is_whole_word() {
        let q = NormalizedQuery::new("Should it rain?");
        assert!(!q.contains("should i"));

        let q = NormalizedQuery::new("should I go?");
        assert!(q.contains("should i"));
    }

    #[test]
    fn test_weigh_counts_each_term_once() {
        let q = NormalizedQuery::new("delete delete delete");
        assert_eq!(q.weigh(&[("delete", 45)]), 45);
    }

    #[test]
    fn test_exact_word_terms() {
        let q = NormalizedQuery::new("Pay the invoice");
        assert!(q.contains("pay$"));
        assert!(!NormalizedQuery::new("Inspect the payload").contains("pay$"));
        assert!(!NormalizedQuery::new("Investigate the outage").contains("invest$"));
        assert!(NormalizedQuery::new("Drop the users table").contains("drop$"));
        assert!(!NormalizedQuery::new("Fix the dropdown").contains("drop$"));
    }

    #[test]
    fn test_shell_flags_normalize() {
        let q = NormalizedQuery::new("run rm -rf /");
        assert!(q.contains("rm rf"));
    }
}
