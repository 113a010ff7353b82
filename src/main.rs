// Jarvis Smart Escalation - CLI
// Main entry point

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Local, Utc};
use clap::Parser;
use crossterm::style::Stylize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::prelude::*;

use jarvis_escalation::cli::display::{render_dashboard, render_decision, render_stats};
use jarvis_escalation::cli::{run_benchmark, InputHandler, Repl, BENCHMARK_CASES};
use jarvis_escalation::config::{load_config, EscalationConfig};
use jarvis_escalation::errors::{
    local_model_unreachable_error, persistence_error, wrap_error_with_suggestion,
    EscalationError,
};
use jarvis_escalation::metrics::{DashboardSummary, DecisionLog, LedgerStore};
use jarvis_escalation::middleware::{EscalationMiddleware, PlatformMessage};
use jarvis_escalation::{EscalationEngine, QueryContext, ReasonCode};

#[derive(Parser, Debug)]
#[command(name = "escalation")]
#[command(about = "Test the smart escalation layer", version)]
struct Args {
    /// Query to route
    query: Vec<String>,

    /// Interactive mode: read queries until /quit or EOF
    #[arg(short, long)]
    interactive: bool,

    /// Show cost savings statistics
    #[arg(short, long)]
    stats: bool,

    /// Run the benchmark suite
    #[arg(short, long)]
    benchmark: bool,

    /// Don't print the local response
    #[arg(long)]
    no_response: bool,

    /// Show the dashboard of recent decisions
    #[arg(long)]
    dashboard: bool,

    /// Dashboard window in hours
    #[arg(long, default_value_t = 24, requires = "dashboard")]
    hours: u64,

    /// Keep refreshing the dashboard
    #[arg(long, requires = "dashboard")]
    watch: bool,

    /// Dashboard refresh interval in seconds
    #[arg(long, default_value_t = 5, requires = "watch")]
    refresh: u64,

    /// Recompute the ledger from the decision log
    #[arg(long)]
    rebuild_ledger: bool,

    /// Run a message through the middleware and print the outcome as JSON
    #[arg(long, value_name = "TEXT")]
    intercept: Option<String>,

    /// User id for --intercept
    #[arg(long, requires = "intercept")]
    user_id: Option<String>,

    /// Config file (default: ~/clawd/config/escalation.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    if args.stats {
        let log = DecisionLog::new(config.log_path());
        let ledger = LedgerStore::new(config.ledger_path()).load_or_rebuild(&log);
        println!("{}", render_stats(&ledger));
        return Ok(());
    }

    if args.dashboard {
        return run_dashboard(&config, args.hours, args.watch, args.refresh).await;
    }

    if args.rebuild_ledger {
        return run_rebuild(&config);
    }

    if let Some(text) = args.intercept {
        return run_intercept(config, text, args.user_id).await;
    }

    let mut engine = EscalationEngine::from_config(&config)?;
    let show_response = !args.no_response;

    if args.benchmark {
        return run_benchmark_mode(&mut engine, &config).await;
    }

    if args.interactive {
        let history = config.workspace_dir.join(".escalation_history");
        let input = InputHandler::new(&history)?;
        return Repl::new(engine, input, show_response).run().await;
    }

    let query = args.query.join(" ");
    if query.trim().is_empty() {
        anyhow::bail!(wrap_error_with_suggestion(
            "No query given",
            "escalation \"What time is it?\" or escalation --interactive"
        ));
    }

    let decision = engine
        .route_query(&query, &QueryContext::default())
        .await
        .context("Failed to route query")?;
    println!("{}", render_decision(&query, &decision, show_response));
    report_degraded(&engine, &config, decision.reason);

    Ok(())
}

async fn run_benchmark_mode(
    engine: &mut EscalationEngine,
    config: &EscalationConfig,
) -> Result<()> {
    println!("{}\n", "Running Benchmark Suite".bold());

    let report = run_benchmark(engine, |case, decision| {
        println!("{}", render_decision(case.query, decision, false));
    })
    .await?;

    let total = BENCHMARK_CASES.len();
    println!("\n{}", "Benchmark Results".bold());
    println!("{}", "=".repeat(50));
    println!("Total tests:       {}", total);
    println!(
        "Local routing:     {} ({:.0}%)",
        report.local.to_string().green(),
        report.local_percentage()
    );
    println!(
        "Cloud routing:     {} ({:.0}%)",
        report.cloud.to_string().yellow(),
        100.0 - report.local_percentage()
    );

    let deviations: Vec<_> = report.deviations().collect();
    if !deviations.is_empty() {
        println!("\n{}", "Escalated despite a local routing decision:".yellow());
        for (case, decision) in deviations {
            println!("  {:<45} {}", case.query, decision.reason);
        }
    }

    println!("{}", render_stats(engine.stats()));

    if report
        .results
        .iter()
        .any(|(_, d)| d.reason == ReasonCode::LocalGenerationFailed)
    {
        eprintln!(
            "{}",
            local_model_unreachable_error(&config.local.base_url, &config.local.model)
        );
    }
    Ok(())
}

async fn run_dashboard(
    config: &EscalationConfig,
    hours: u64,
    watch: bool,
    refresh: u64,
) -> Result<()> {
    let log = DecisionLog::new(config.log_path());
    let store = LedgerStore::new(config.ledger_path());

    loop {
        let since = Utc::now() - ChronoDuration::hours(hours as i64);
        let recent = log.read_recent(since)?;
        let summary = DashboardSummary::from_decisions(&recent, &Local);
        let ledger = store.load_or_rebuild(&log);

        if watch {
            // Clear screen and home the cursor
            print!("\x1b[2J\x1b[H");
        }
        println!("{}", render_dashboard(&ledger, &summary, hours, Utc::now()));

        if !watch {
            return Ok(());
        }
        println!("Refreshing every {}s (Ctrl+C to exit)", refresh);
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(refresh.max(1))) => {}
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}

fn run_rebuild(config: &EscalationConfig) -> Result<()> {
    let log = DecisionLog::new(config.log_path());
    let store = LedgerStore::new(config.ledger_path());

    let ledger = jarvis_escalation::metrics::rebuild_ledger_from_log(&log)?;
    store
        .save(&ledger)
        .map_err(|e| with_persistence_hint(e, store.path(), "write"))?;

    println!("Rebuilt ledger from {}", log.path().display());
    println!("{}", render_stats(&ledger));
    Ok(())
}

async fn run_intercept(
    config: EscalationConfig,
    text: String,
    user_id: Option<String>,
) -> Result<()> {
    let mut middleware = EscalationMiddleware::from_config(config)?;
    let message = PlatformMessage {
        user_id,
        timestamp: Some(Utc::now()),
        ..PlatformMessage::text(text)
    };

    let outcome = middleware.intercept(&message).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

/// Surface problems that did not stop the query but the operator should see
fn report_degraded(engine: &EscalationEngine, config: &EscalationConfig, reason: ReasonCode) {
    if engine.persist_failures() > 0 {
        eprintln!(
            "{}",
            persistence_error(&display_path(engine.decision_log().path()), "append to")
        );
    }
    if reason == ReasonCode::LocalGenerationFailed {
        eprintln!(
            "{}",
            local_model_unreachable_error(&config.local.base_url, &config.local.model)
        );
    }
}

/// Attach the permissions checklist to write failures only
fn with_persistence_hint(e: EscalationError, path: &Path, action: &str) -> anyhow::Error {
    if e.is_persistence() {
        anyhow::anyhow!("{}\n\n{}", e, persistence_error(&display_path(path), action))
    } else {
        e.into()
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

/// Initialize tracing
///
/// Logs go to stderr so they never mix with rendered output. Default level
/// is WARN; RUST_LOG overrides it and ESCALATION_DEBUG=1 raises it to DEBUG.
fn init_tracing() {
    let show_debug = std::env::var("ESCALATION_DEBUG")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false);
    let default_level = if show_debug { "debug" } else { "warn" };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Bridge log crate -> tracing (for dependencies using log crate)
    tracing_log::LogTracer::init().ok();
}
