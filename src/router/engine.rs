// Escalation engine - the full routing pipeline
//
// analyze -> decide -> (local: respond under a time budget) -> savings
//         -> append to decision log -> update ledger
//
// Persistence runs after the last await point, so dropping a routing future
// mid-flight never leaves a partial decision behind.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::time::Instant;

use super::context::QueryContext;
use super::decision::{ReasonCode, Route, RoutingPolicy};
use super::record::RoutingDecision;
use crate::analyzer::{ComplexityAnalyzer, ComplexityScore};
use crate::config::EscalationConfig;
use crate::errors::EscalationError;
use crate::local::{
    LocalAnswerFailure, LocalResponder, OllamaResponder, ResponderChain, TemplateResponder,
};
use crate::metrics::{
    rebuild_ledger_from_log, DecisionLog, LedgerStore, SavingsCalculator, SavingsLedger,
};

/// Routes queries, answers the easy ones locally, and keeps the books
pub struct EscalationEngine {
    analyzer: ComplexityAnalyzer,
    policy: RoutingPolicy,
    responder: Box<dyn LocalResponder>,
    savings: SavingsCalculator,
    log: DecisionLog,
    store: LedgerStore,
    ledger: SavingsLedger,
    last_timestamp: Option<DateTime<Utc>>,
    persist_failures: u64,
}

impl EscalationEngine {
    /// Build an engine around explicit parts. Loads the ledger, rebuilding
    /// it from the log if the stored copy is unreadable.
    pub fn new(
        policy: RoutingPolicy,
        responder: Box<dyn LocalResponder>,
        savings: SavingsCalculator,
        log: DecisionLog,
        store: LedgerStore,
    ) -> Self {
        let ledger = store.load_or_rebuild(&log);

        Self {
            analyzer: ComplexityAnalyzer::new(),
            policy,
            responder,
            savings,
            last_timestamp: ledger.last_updated,
            log,
            store,
            ledger,
            persist_failures: 0,
        }
    }

    /// Standard engine: templates first, then the Ollama model
    pub fn from_config(config: &EscalationConfig) -> Result<Self> {
        let ollama = OllamaResponder::new(
            config.local.base_url.clone(),
            config.local.model.clone(),
            config.workspace_dir.clone(),
        )?;
        let responder = ResponderChain::new(vec![
            Box::new(TemplateResponder::new()),
            Box::new(ollama),
        ]);

        Ok(Self::new(
            RoutingPolicy::new(config.local.timeout(), config.local.min_timeout()),
            Box::new(responder),
            SavingsCalculator::new(config.pricing.clone()),
            DecisionLog::new(config.log_path()),
            LedgerStore::new(config.ledger_path()),
        ))
    }

    /// Route one query end to end.
    ///
    /// `InvalidQuery` propagates. Persistence failures do not: the decision is
    /// still returned and `persist_failures()` goes up.
    pub async fn route_query(
        &mut self,
        query: &str,
        context: &QueryContext,
    ) -> Result<RoutingDecision, EscalationError> {
        let started = Instant::now();
        let complexity = self.analyzer.analyze(query)?;
        let query = query.trim();
        let outcome = self.policy.decide(&complexity, context);

        let (route, reason, local_response) = match outcome.route {
            Route::Cloud => (Route::Cloud, outcome.reason, None),
            Route::Local => match self.generate_local(query, &complexity, context).await {
                Ok(answer) => (Route::Local, outcome.reason, Some(answer)),
                Err(failure) => {
                    tracing::warn!(
                        "Local generation failed ({}), escalating to cloud: {}",
                        self.responder.name(),
                        failure
                    );
                    (Route::Cloud, ReasonCode::LocalGenerationFailed, None)
                }
            },
        };

        let savings = self.savings.compute(query, route, local_response.as_deref());

        let decision = RoutingDecision {
            route,
            reason,
            complexity,
            local_response,
            response_time_ms: started.elapsed().as_millis() as u64,
            tokens_saved: savings.tokens,
            cost_saved: savings.cost,
            timestamp: self.next_timestamp(),
        };

        self.persist(&decision);
        Ok(decision)
    }

    async fn generate_local(
        &self,
        query: &str,
        complexity: &ComplexityScore,
        context: &QueryContext,
    ) -> Result<String, LocalAnswerFailure> {
        let budget = self.policy.local_generation_budget(complexity);
        match tokio::time::timeout(budget, self.responder.respond(query, complexity, context))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(LocalAnswerFailure::TimedOut {
                after_ms: budget.as_millis() as u64,
            }),
        }
    }

    /// Wall clock, but never earlier than the previous decision
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }

    /// Log first; only a logged decision reaches the ledger
    fn persist(&mut self, decision: &RoutingDecision) {
        if let Err(e) = self.log.append(decision) {
            self.persist_failures += 1;
            tracing::warn!("Decision not persisted: {}", e);
            return;
        }

        self.ledger = self.ledger.record(decision);
        if let Err(e) = self.store.save(&self.ledger) {
            self.persist_failures += 1;
            tracing::warn!("Ledger not saved (rebuildable from log): {}", e);
        }
    }

    /// Replay the decision log into a fresh ledger and save it
    pub fn rebuild_ledger(&mut self) -> Result<SavingsLedger, EscalationError> {
        let ledger = rebuild_ledger_from_log(&self.log)?;
        self.store.save(&ledger)?;
        self.last_timestamp = self.last_timestamp.max(ledger.last_updated);
        self.ledger = ledger.clone();
        Ok(ledger)
    }

    /// Current lifetime totals
    pub fn stats(&self) -> &SavingsLedger {
        &self.ledger
    }

    /// Decisions returned but not fully persisted since construction
    pub fn persist_failures(&self) -> u64 {
        self.persist_failures
    }

    pub fn analyzer(&self) -> &ComplexityAnalyzer {
        &self.analyzer
    }

    pub fn decision_log(&self) -> &DecisionLog {
        &self.log
    }

    pub fn ledger_store(&self) -> &LedgerStore {
        &self.store
    }
}
