// Routing decision logic
//
// Explicit precedence table, highest priority first:
//   1. decision_making >= 70 or reversibility >= 70   -> cloud (high_stakes)
//   2. confidence < 40                                -> cloud (low_local_confidence)
//   3. overall > 66                                   -> cloud (high_complexity)
//   4. overall <= 33                                  -> local (low_complexity)
//   5. otherwise local iff confidence >= 60           (medium_complexity_confidence_gate)
//
// Rule 1 must stay first: irreversible or high-stakes actions are never
// answered locally, whatever the other dimensions say.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::context::QueryContext;
use crate::analyzer::{ComplexityBand, ComplexityScore};

pub const HIGH_STAKES_THRESHOLD: u32 = 70;
pub const LOW_CONFIDENCE_THRESHOLD: u32 = 40;
pub const MEDIUM_GATE_CONFIDENCE: u32 = 60;

/// Where a query is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Local,
    Cloud,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Local => "local",
            Route::Cloud => "cloud",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable, machine-readable reason for a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    HighStakes,
    LowLocalConfidence,
    HighComplexity,
    LowComplexity,
    MediumComplexityConfidenceGate,
    /// Routed local, but the local responder failed or timed out
    LocalGenerationFailed,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::HighStakes => "high_stakes",
            ReasonCode::LowLocalConfidence => "low_local_confidence",
            ReasonCode::HighComplexity => "high_complexity",
            ReasonCode::LowComplexity => "low_complexity",
            ReasonCode::MediumComplexityConfidenceGate => "medium_complexity_confidence_gate",
            ReasonCode::LocalGenerationFailed => "local_generation_failed",
        }
    }

    /// Human-readable explanation. Wording may change; the code may not.
    pub fn describe(&self, complexity: &ComplexityScore) -> String {
        match self {
            ReasonCode::HighStakes => format!(
                "High-stakes or irreversible (decision {}/100, reversibility {}/100)",
                complexity.decision_making, complexity.reversibility
            ),
            ReasonCode::LowLocalConfidence => {
                format!("Low local confidence ({}%)", complexity.confidence)
            }
            ReasonCode::HighComplexity => {
                format!("High complexity ({}/100)", complexity.overall)
            }
            ReasonCode::LowComplexity => format!("Low complexity ({}/100)", complexity.overall),
            ReasonCode::MediumComplexityConfidenceGate => format!(
                "Medium complexity ({}/100), local confidence {}%",
                complexity.overall, complexity.confidence
            ),
            ReasonCode::LocalGenerationFailed => "Local model could not answer".to_string(),
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Route and reason chosen by the policy, before any local generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyOutcome {
    pub route: Route,
    pub reason: ReasonCode,
}

/// Decides local vs cloud from a complexity score
#[derive(Debug, Clone)]
pub struct RoutingPolicy {
    local_timeout: Duration,
    min_local_timeout: Duration,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(8), Duration::from_millis(1000))
    }
}

impl RoutingPolicy {
    pub fn new(local_timeout: Duration, min_local_timeout: Duration) -> Self {
        Self {
            local_timeout,
            min_local_timeout,
        }
    }

    /// Apply the precedence table
    pub fn decide(&self, complexity: &ComplexityScore, context: &QueryContext) -> PolicyOutcome {
        let outcome = Self::apply_rules(complexity);

        tracing::info!(
            route = outcome.route.as_str(),
            reason = outcome.reason.as_str(),
            user_id = context.user_id.as_deref().unwrap_or("-"),
            "Routing decision"
        );

        outcome
    }

    fn apply_rules(complexity: &ComplexityScore) -> PolicyOutcome {
        let (route, reason) = if complexity.decision_making >= HIGH_STAKES_THRESHOLD
            || complexity.reversibility >= HIGH_STAKES_THRESHOLD
        {
            (Route::Cloud, ReasonCode::HighStakes)
        } else if complexity.confidence < LOW_CONFIDENCE_THRESHOLD {
            (Route::Cloud, ReasonCode::LowLocalConfidence)
        } else {
            match complexity.band() {
                ComplexityBand::High => (Route::Cloud, ReasonCode::HighComplexity),
                ComplexityBand::Low => (Route::Local, ReasonCode::LowComplexity),
                ComplexityBand::Medium => {
                    let route = if complexity.confidence >= MEDIUM_GATE_CONFIDENCE {
                        Route::Local
                    } else {
                        Route::Cloud
                    };
                    (route, ReasonCode::MediumComplexityConfidenceGate)
                }
            }
        };

        PolicyOutcome { route, reason }
    }

    /// Time budget for local generation; urgent queries get up to half less
    pub fn local_generation_budget(&self, complexity: &ComplexityScore) -> Duration {
        let factor = 100 - complexity.time_sensitivity.min(100) / 2;
        let budget = self.local_timeout * factor / 100;
        budget.max(self.min_local_timeout)
    }
}
