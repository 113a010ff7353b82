// Jarvis Smart Escalation - answer cheap queries locally, escalate the rest
// Library exports

pub mod analyzer; // Six-dimension complexity scoring
pub mod cli;
pub mod config;
pub mod errors;
pub mod local; // Local responders (templates, Ollama)
pub mod metrics; // Savings, decision log, ledger, dashboard
pub mod middleware; // Chat platform adapter
pub mod router; // Routing policy and engine

pub use analyzer::{ComplexityAnalyzer, ComplexityScore};
pub use errors::EscalationError;
pub use router::{EscalationEngine, QueryContext, ReasonCode, Route, RoutingDecision};
