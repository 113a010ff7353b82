// Savings calculator - what a local answer would have cost in the cloud

use serde::{Deserialize, Serialize};

use crate::router::Route;

/// Cloud pricing used to value a local answer (USD per million tokens)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
    /// Characters per token for the length-based token estimate
    pub chars_per_token: u32,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            input_per_million: 3.00,
            output_per_million: 15.00,
            chars_per_token: 4,
        }
    }
}

/// Tokens and dollars saved by one decision
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Savings {
    pub tokens: u64,
    pub cost: f64,
}

/// Deterministic token and cost estimator
#[derive(Debug, Clone, Default)]
pub struct SavingsCalculator {
    pricing: Pricing,
}

impl SavingsCalculator {
    pub fn new(pricing: Pricing) -> Self {
        Self { pricing }
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    /// Estimated token count of a text: ceil(chars / chars_per_token).
    /// Any non-empty text is at least one token.
    pub fn estimate_tokens(&self, text: &str) -> u64 {
        let chars = text.chars().count() as u64;
        let per_token = u64::from(self.pricing.chars_per_token.max(1));
        chars.div_ceil(per_token)
    }

    /// Savings for one routed query.
    ///
    /// Cloud routes save nothing. Local routes save the input tokens of the
    /// query plus the output tokens of the answer the cloud would have written.
    pub fn compute(&self, query: &str, route: Route, local_response: Option<&str>) -> Savings {
        if route == Route::Cloud {
            return Savings::default();
        }

        let input_tokens = self.estimate_tokens(query);
        let output_tokens = local_response.map_or(0, |r| self.estimate_tokens(r));
        let cost = input_tokens as f64 * self.pricing.input_per_million / 1_000_000.0
            + output_tokens as f64 * self.pricing.output_per_million / 1_000_000.0;

        Savings {
            tokens: input_tokens + output_tokens,
            cost: cost.max(0.0),
        }
    }
}
