// Terminal rendering for decisions, ledger stats and the dashboard
//
// Everything renders to a String so the binary decides where it goes.

use chrono::{DateTime, Utc};
use crossterm::style::Stylize;
use std::fmt::Write;

use crate::analyzer::{ComplexityAnalyzer, ComplexityScore};
use crate::metrics::{DashboardSummary, SavingsLedger};
use crate::router::{Route, RoutingDecision};

const RULE_WIDTH: usize = 70;
const BAR_WIDTH: usize = 30;

fn rule(ch: char) -> String {
    ch.to_string().repeat(RULE_WIDTH)
}

/// `label ██████░░░░ 42/100`, green up to 40, yellow up to 70, red above
pub fn complexity_bar(label: &str, value: u32) -> String {
    let value = value.min(100);
    let filled = value as usize * BAR_WIDTH / 100;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));
    let bar = if value > 70 {
        bar.red()
    } else if value > 40 {
        bar.yellow()
    } else {
        bar.green()
    };
    format!("  {:<25} {} {:>3}/100", label, bar, value)
}

pub fn render_complexity(score: &ComplexityScore) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Complexity Analysis:".bold());
    for (label, value) in score.dimensions() {
        let _ = writeln!(out, "{}", complexity_bar(label, value));
    }
    out
}

/// Full report for one routed query
pub fn render_decision(query: &str, decision: &RoutingDecision, show_response: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule('=').bold());
    let _ = writeln!(out, "{} {}", "Query:".magenta(), query);
    let shape = ComplexityAnalyzer::new().shape_of(query);
    let _ = writeln!(out, "{} {}", "Shape:".magenta(), shape.as_str());
    let _ = writeln!(out, "{}\n", rule('=').bold());

    out.push_str(&render_complexity(&decision.complexity));

    let _ = writeln!(out, "\n{}", "Routing Decision:".bold());
    match decision.route {
        Route::Local => {
            let _ = writeln!(out, "  Route:         {} (local model)", "LOCAL".green());
            let _ = writeln!(
                out,
                "  Reason:        {} ({})",
                decision.reason,
                decision.explanation()
            );
            let _ = writeln!(out, "  Response time: {}ms", decision.response_time_ms);
            let _ = writeln!(out, "  Tokens saved:  {}", decision.tokens_saved);
            let _ = writeln!(out, "  Cost saved:    ${:.6}", decision.cost_saved);

            if show_response {
                if let Some(response) = &decision.local_response {
                    let _ = writeln!(out, "\n{}", "Local Response:".bold());
                    let _ = writeln!(out, "{}", response.as_str().cyan());
                }
            }
        }
        Route::Cloud => {
            let _ = writeln!(out, "  Route:         {} (escalated)", "CLOUD".yellow());
            let _ = writeln!(
                out,
                "  Reason:        {} ({})",
                decision.reason,
                decision.explanation()
            );
            let _ = writeln!(out, "  Evaluation:    {}ms", decision.response_time_ms);
        }
    }
    out
}

/// Lifetime savings
pub fn render_stats(ledger: &SavingsLedger) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", "Cost Savings Statistics".bold());
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out, "Total queries:     {}", ledger.total_queries);
    let _ = writeln!(
        out,
        "Local queries:     {} ({:.1}%)",
        ledger.local_queries.to_string().green(),
        ledger.local_percentage()
    );
    let _ = writeln!(
        out,
        "Cloud queries:     {}",
        ledger.cloud_queries.to_string().yellow()
    );
    let _ = writeln!(out, "Tokens saved:      {}", ledger.tokens_saved);
    let _ = writeln!(
        out,
        "Cost saved:        {}",
        format!("${:.4}", ledger.cost_saved).green()
    );

    if let Some(started) = ledger.started {
        let _ = writeln!(out, "\nTracking since:    {}", started.to_rfc3339());
    }
    if let Some(updated) = ledger.last_updated {
        let _ = writeln!(out, "Last updated:      {}", updated.to_rfc3339());
    }
    out
}

fn band_line(label: &str, count: u64, pct: f64) -> String {
    let blocks = "█".repeat((pct / 2.0) as usize);
    format!("  {:<22} {} {} ({:.1}%)", label, blocks, count, pct)
}

/// Dashboard: lifetime totals plus a summary of the last `hours`
pub fn render_dashboard(
    ledger: &SavingsLedger,
    summary: &DashboardSummary,
    hours: u64,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule('='));
    let _ = writeln!(out, "{:^70}", "Smart Escalation Dashboard");
    let _ = writeln!(out, "{}\n", rule('='));

    let _ = writeln!(out, "{}", "Overall Statistics (All Time)".bold());
    let _ = writeln!(out, "{}", rule('-'));
    let _ = writeln!(out, "  Total queries:         {}", ledger.total_queries);
    let _ = writeln!(
        out,
        "  Local queries:         {} ({:.1}%)",
        ledger.local_queries,
        ledger.local_percentage()
    );
    let _ = writeln!(out, "  Cloud queries:         {}", ledger.cloud_queries);
    let _ = writeln!(out, "  Tokens saved:          {}", ledger.tokens_saved);
    let _ = writeln!(out, "  Cost saved:            ${:.4}", ledger.cost_saved);
    if let Some(started) = ledger.started {
        let days = (now - started).num_days().max(0) + 1;
        let _ = writeln!(out, "  Running for:           {} days", days);
        let _ = writeln!(
            out,
            "  Avg savings/day:       ${:.4}",
            ledger.cost_saved / days as f64
        );
    }

    let _ = writeln!(out, "\n{}", format!("Recent Activity (Last {} hours)", hours).bold());
    let _ = writeln!(out, "{}", rule('-'));
    let _ = writeln!(out, "  Queries:               {}", summary.total);
    let _ = writeln!(
        out,
        "  Local:                 {} ({:.1}%)",
        summary.local,
        summary.local_percentage()
    );
    let _ = writeln!(out, "  Cloud:                 {}", summary.cloud);
    let _ = writeln!(out, "  Avg complexity:        {:.1}/100", summary.avg_complexity);
    let _ = writeln!(out, "  Avg response time:     {:.0}ms", summary.avg_response_time_ms);
    let _ = writeln!(out, "  Tokens saved:          {}", summary.tokens_saved);
    let _ = writeln!(out, "  Cost saved:            ${:.4}", summary.cost_saved);

    let (low, medium, high) = summary.band_percentages();
    let _ = writeln!(out, "\n{}", "Complexity Distribution".bold());
    let _ = writeln!(out, "{}", rule('-'));
    let _ = writeln!(out, "{}", band_line("Low (0-33):", summary.bands.low, low));
    let _ = writeln!(out, "{}", band_line("Medium (34-66):", summary.bands.medium, medium));
    let _ = writeln!(out, "{}", band_line("High (67-100):", summary.bands.high, high));

    if !summary.top_reasons.is_empty() {
        let total = summary.total.max(1) as f64;
        let _ = writeln!(out, "\n{}", "Top Reasons".bold());
        let _ = writeln!(out, "{}", rule('-'));
        for (reason, count) in &summary.top_reasons {
            let _ = writeln!(
                out,
                "  {:<40} {:>4} ({:.1}%)",
                reason.as_str(),
                count,
                *count as f64 / total * 100.0
            );
        }
    }

    if summary.total > 0 {
        let peak = summary.hourly.iter().copied().max().unwrap_or(0).max(1);
        let _ = writeln!(out, "\n{}", "Hourly Distribution".bold());
        let _ = writeln!(out, "{}", rule('-'));
        for (hour, count) in summary.hourly.iter().enumerate() {
            if *count == 0 {
                continue;
            }
            let blocks = "█".repeat((*count * 40 / peak) as usize);
            let _ = writeln!(out, "  {:02}:00  {} {}", hour, blocks, count);
        }
    }

    let _ = writeln!(out, "\n{}", rule('='));
    let _ = writeln!(out, "Last updated: {}", now.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "{}", rule('='));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::ReasonCode;

    fn decision(route: Route) -> RoutingDecision {
        let local = route == Route::Local;
        RoutingDecision {
            route,
            reason: ReasonCode::LowComplexity,
            complexity: ComplexityScore::from_dimensions(10, 0, 0, 20, 0, 90).unwrap(),
            local_response: local.then(|| "It's noon.".to_string()),
            response_time_ms: 42,
            tokens_saved: if local { 7 } else { 0 },
            cost_saved: if local { 0.000057 } else { 0.0 },
            timestamp: "2026-01-01T12:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_complexity_bar() {
        let bar = complexity_bar("Overall", 50);
        assert!(bar.contains("Overall"));
        assert!(bar.contains(" 50/100"));
        assert_eq!(bar.matches('█').count(), 15);
        assert_eq!(bar.matches('░').count(), 15);
    }

    #[test]
    fn test_render_local_decision() {
        let text = render_decision("What time is it?", &decision(Route::Local), true);
        assert!(text.contains("What time is it?"));
        assert!(text.contains("LOCAL"));
        assert!(text.contains("low_complexity"));
        assert!(text.contains("It's noon."));
        assert!(text.contains("Local Confidence"));

        let hidden = render_decision("What time is it?", &decision(Route::Local), false);
        assert!(!hidden.contains("It's noon."));
    }

    #[test]
    fn test_render_stats() {
        let ledger = SavingsLedger::new().record(&decision(Route::Local));
        let text = render_stats(&ledger);
        assert!(text.contains("Total queries:     1"));
        assert!(text.contains("100.0%"));
        assert!(text.contains("Tracking since:"));
    }

    #[test]
    fn test_render_dashboard() {
        let decisions = vec![decision(Route::Local), decision(Route::Cloud)];
        let ledger = SavingsLedger::from_decisions(decisions.clone());
        let summary = DashboardSummary::from_decisions(&decisions, &Utc);
        let now = "2026-01-03T12:00:00Z".parse().unwrap();

        let text = render_dashboard(&ledger, &summary, 24, now);
        assert!(text.contains("Smart Escalation Dashboard"));
        assert!(text.contains("Running for:           3 days"));
        assert!(text.contains("Recent Activity (Last 24 hours)"));
        assert!(text.contains("low_complexity"));
        assert!(text.contains("12:00"));
    }
}
