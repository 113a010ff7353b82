// Routing decision record - one per routed query, never mutated after creation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::decision::{ReasonCode, Route};
use crate::analyzer::ComplexityScore;
use crate::errors::EscalationError;

/// Outcome of routing one query. This is exactly one decision-log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub route: Route,
    pub reason: ReasonCode,
    pub complexity: ComplexityScore,
    /// Present only when `route` is local and an answer was generated
    pub local_response: Option<String>,
    pub response_time_ms: u64,
    pub tokens_saved: u64,
    pub cost_saved: f64,
    pub timestamp: DateTime<Utc>,
}

impl RoutingDecision {
    pub fn is_local(&self) -> bool {
        self.route == Route::Local
    }

    /// Human-readable reason
    pub fn explanation(&self) -> String {
        self.reason.describe(&self.complexity)
    }

    /// Check the record invariants: valid score, no savings or response on
    /// cloud routes, no local route without a response.
    pub fn validate(&self) -> Result<(), EscalationError> {
        self.complexity.validate()?;

        let consistent = match self.route {
            Route::Cloud => {
                self.local_response.is_none() && self.tokens_saved == 0 && self.cost_saved == 0.0
            }
            Route::Local => self.local_response.is_some(),
        };
        if !consistent || !self.cost_saved.is_finite() || self.cost_saved < 0.0 {
            return Err(EscalationError::InvalidDecision(format!(
                "inconsistent {} decision ({})",
                self.route, self.reason
            )));
        }
        Ok(())
    }
}
