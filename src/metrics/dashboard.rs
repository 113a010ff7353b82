// Dashboard summary - aggregate view over a window of decisions

use chrono::{TimeZone, Timelike};
use std::collections::HashMap;

use crate::analyzer::ComplexityBand;
use crate::router::{ReasonCode, Route, RoutingDecision};

/// How many reasons the dashboard lists
const TOP_REASONS: usize = 5;

/// Decisions per complexity band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandCounts {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

/// Aggregates over a set of decisions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSummary {
    pub total: u64,
    pub local: u64,
    pub cloud: u64,
    pub avg_complexity: f64,
    pub avg_response_time_ms: f64,
    pub tokens_saved: u64,
    pub cost_saved: f64,
    pub bands: BandCounts,
    /// Most frequent reasons, most common first
    pub top_reasons: Vec<(ReasonCode, u64)>,
    /// Decisions per hour of day in `tz`
    pub hourly: [u64; 24],
}

impl DashboardSummary {
    /// Summarize decisions, bucketing hours in the given time zone
    pub fn from_decisions<Tz: TimeZone>(decisions: &[RoutingDecision], tz: &Tz) -> Self {
        let mut summary = DashboardSummary::default();
        if decisions.is_empty() {
            return summary;
        }

        let mut complexity_sum = 0u64;
        let mut response_time_sum = 0u64;
        let mut reasons: HashMap<ReasonCode, u64> = HashMap::new();

        for decision in decisions {
            summary.total += 1;
            match decision.route {
                Route::Local => summary.local += 1,
                Route::Cloud => summary.cloud += 1,
            }

            complexity_sum += u64::from(decision.complexity.overall);
            match decision.complexity.band() {
                ComplexityBand::Low => summary.bands.low += 1,
                ComplexityBand::Medium => summary.bands.medium += 1,
                ComplexityBand::High => summary.bands.high += 1,
            }

            response_time_sum += decision.response_time_ms;
            summary.tokens_saved += decision.tokens_saved;
            summary.cost_saved += decision.cost_saved;

            let hour = decision.timestamp.with_timezone(tz).hour() as usize;
            summary.hourly[hour] += 1;

            *reasons.entry(decision.reason).or_insert(0) += 1;
        }

        summary.avg_complexity = complexity_sum as f64 / summary.total as f64;
        summary.avg_response_time_ms = response_time_sum as f64 / summary.total as f64;

        let mut top: Vec<_> = reasons.into_iter().collect();
        // Ties broken by code so output is stable
        top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
        top.truncate(TOP_REASONS);
        summary.top_reasons = top;

        summary
    }

    pub fn local_percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.local as f64 / self.total as f64 * 100.0
    }

    /// Percentage of decisions in each band (low, medium, high)
    pub fn band_percentages(&self) -> (f64, f64, f64) {
        let total = self.total.max(1) as f64;
        (
            self.bands.low as f64 / total * 100.0,
            self.bands.medium as f64 / total * 100.0,
            self.bands.high as f64 / total * 100.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::ComplexityScore;
    use chrono::Utc;

    fn decision(route: Route, reason: ReasonCode, fr: u32, at: &str) -> RoutingDecision {
        let local = route == Route::Local;
        RoutingDecision {
            route,
            reason,
            complexity: ComplexityScore::from_dimensions(fr, 0, 0, 0, 0, 80).unwrap(),
            local_response: local.then(|| "answer".to_string()),
            response_time_ms: 100,
            tokens_saved: if local { 10 } else { 0 },
            cost_saved: if local { 0.0001 } else { 0.0 },
            timestamp: at.parse().unwrap(),
        }
    }

    #[test]
    fn test_empty() {
        let summary = DashboardSummary::from_decisions(&[], &Utc);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.local_percentage(), 0.0);
    }

    #[test]
    fn test_summary() {
        let decisions = vec![
            decision(Route::Local, ReasonCode::LowComplexity, 10, "2026-01-01T09:15:00Z"),
            decision(Route::Local, ReasonCode::LowComplexity, 20, "2026-01-01T09:45:00Z"),
            decision(Route::Cloud, ReasonCode::HighComplexity, 80, "2026-01-01T14:00:00Z"),
            decision(
                Route::Cloud,
                ReasonCode::MediumComplexityConfidenceGate,
                50,
                "2026-01-01T14:30:00Z",
            ),
        ];
        let summary = DashboardSummary::from_decisions(&decisions, &Utc);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.local, 2);
        assert_eq!(summary.cloud, 2);
        assert_eq!(summary.tokens_saved, 20);
        assert_eq!(summary.avg_response_time_ms, 100.0);
        assert_eq!(summary.bands, BandCounts { low: 2, medium: 1, high: 1 });
        assert_eq!(summary.hourly[9], 2);
        assert_eq!(summary.hourly[14], 2);
        assert_eq!(summary.top_reasons[0], (ReasonCode::LowComplexity, 2));
        assert_eq!(summary.top_reasons.len(), 3);
        assert_eq!(summary.local_percentage(), 50.0);
    }
}
