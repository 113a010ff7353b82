// Router module
// Routing policy, decision records and the end-to-end escalation engine

mod context;
mod decision;
mod engine;
mod record;

pub use context::QueryContext;
pub use decision::{
    PolicyOutcome, ReasonCode, Route, RoutingPolicy, HIGH_STAKES_THRESHOLD,
    LOW_CONFIDENCE_THRESHOLD, MEDIUM_GATE_CONFIDENCE,
};
pub use engine::EscalationEngine;
pub use record::RoutingDecision;
