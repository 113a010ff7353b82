// Benchmark suite - representative queries covering every routing branch

use crate::errors::EscalationError;
use crate::router::{EscalationEngine, QueryContext, ReasonCode, Route, RoutingDecision};

/// One benchmark query and the policy outcome it is expected to get
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkCase {
    pub query: &'static str,
    pub category: &'static str,
    pub expected_route: Route,
    pub expected_reason: ReasonCode,
}

const fn case(
    query: &'static str,
    category: &'static str,
    expected_route: Route,
    expected_reason: ReasonCode,
) -> BenchmarkCase {
    BenchmarkCase {
        query,
        category,
        expected_route,
        expected_reason,
    }
}

pub const BENCHMARK_CASES: &[BenchmarkCase] = &[
    // Factual
    case("What time is it?", "factual-simple", Route::Local, ReasonCode::LowComplexity),
    case("What's the weather like?", "factual-data", Route::Local, ReasonCode::LowComplexity),
    case("Show me today's memory", "factual-file", Route::Local, ReasonCode::LowComplexity),
    // Light reasoning
    case(
        "What's the difference between TCP and UDP?",
        "reasoning-light",
        Route::Local,
        ReasonCode::LowComplexity,
    ),
    case(
        "Explain how Python decorators work",
        "reasoning-light",
        Route::Local,
        ReasonCode::LowComplexity,
    ),
    // Medium
    case(
        "Summarize the last week of work",
        "reasoning-medium",
        Route::Local,
        ReasonCode::MediumComplexityConfidenceGate,
    ),
    case(
        "What should I focus on today?",
        "reasoning-medium",
        Route::Cloud,
        ReasonCode::LowLocalConfidence,
    ),
    case(
        "Analyze recent cost trends",
        "reasoning-medium",
        Route::Cloud,
        ReasonCode::MediumComplexityConfidenceGate,
    ),
    // High
    case(
        "Design a distributed system architecture",
        "complex-architecture",
        Route::Cloud,
        ReasonCode::HighComplexity,
    ),
    case(
        "Should I invest in Bitcoin or Tesla?",
        "complex-decision",
        Route::Cloud,
        ReasonCode::HighStakes,
    ),
    case(
        "Write a strategic plan for product launch",
        "complex-creative",
        Route::Cloud,
        ReasonCode::HighComplexity,
    ),
    case(
        "Refactor this entire codebase for performance",
        "complex-irreversible",
        Route::Cloud,
        ReasonCode::HighStakes,
    ),
];

/// Local/cloud split over a benchmark run
#[derive(Debug, Clone, Default)]
pub struct BenchmarkReport {
    pub results: Vec<(BenchmarkCase, RoutingDecision)>,
    pub local: usize,
    pub cloud: usize,
}

impl BenchmarkReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn local_percentage(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        self.local as f64 / self.total() as f64 * 100.0
    }

    /// Cases whose final route differs from the policy expectation
    /// (usually local cases the local model could not answer)
    pub fn deviations(&self) -> impl Iterator<Item = &(BenchmarkCase, RoutingDecision)> {
        self.results
            .iter()
            .filter(|(case, decision)| case.expected_route != decision.route)
    }
}

/// Route every benchmark query through the engine, calling `on_result` after each
pub async fn run_benchmark<F>(
    engine: &mut EscalationEngine,
    mut on_result: F,
) -> Result<BenchmarkReport, EscalationError>
where
    F: FnMut(&BenchmarkCase, &RoutingDecision),
{
    let mut report = BenchmarkReport::default();
    let context = QueryContext::default();

    for case in BENCHMARK_CASES {
        let decision = engine.route_query(case.query, &context).await?;
        on_result(case, &decision);

        match decision.route {
            Route::Local => report.local += 1,
            Route::Cloud => report.cloud += 1,
        }
        report.results.push((*case, decision));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::ComplexityAnalyzer;
    use crate::router::RoutingPolicy;
    use std::collections::HashSet;

    #[test]
    fn test_cases_match_policy() {
        let analyzer = ComplexityAnalyzer::new();
        let policy = RoutingPolicy::default();
        for case in BENCHMARK_CASES {
            let score = analyzer.analyze(case.query).unwrap();
            let outcome = policy.decide(&score, &QueryContext::default());
            assert_eq!(outcome.route, case.expected_route, "{}", case.query);
            assert_eq!(outcome.reason, case.expected_reason, "{}", case.query);
        }
    }

    #[test]
    fn test_suite_covers_all_branches() {
        let reasons: HashSet<_> = BENCHMARK_CASES.iter().map(|c| c.expected_reason).collect();
        assert!(reasons.contains(&ReasonCode::HighStakes));
        assert!(reasons.contains(&ReasonCode::LowLocalConfidence));
        assert!(reasons.contains(&ReasonCode::HighComplexity));
        assert!(reasons.contains(&ReasonCode::LowComplexity));
        assert!(reasons.contains(&ReasonCode::MediumComplexityConfidenceGate));

        let gate_routes: HashSet<_> = BENCHMARK_CASES
            .iter()
            .filter(|c| c.expected_reason == ReasonCode::MediumComplexityConfidenceGate)
            .map(|c| c.expected_route)
            .collect();
        assert_eq!(gate_routes.len(), 2);
    }
}
