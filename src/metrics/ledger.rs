// Savings ledger - cumulative totals derived from the decision log
//
// The ledger is a cache: it can always be rebuilt by replaying the log.

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use super::decision_log::DecisionLog;
use crate::errors::EscalationError;
use crate::router::{Route, RoutingDecision};

/// Lifetime routing and savings totals.
///
/// Invariant: `total_queries == local_queries + cloud_queries`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavingsLedger {
    pub total_queries: u64,
    pub local_queries: u64,
    pub cloud_queries: u64,
    pub tokens_saved: u64,
    pub cost_saved: f64,
    /// Timestamp of the first recorded decision
    pub started: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl SavingsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger after recording one more decision. Pure; `self` is untouched.
    pub fn record(&self, decision: &RoutingDecision) -> SavingsLedger {
        let mut next = self.clone();
        next.total_queries += 1;
        match decision.route {
            Route::Local => next.local_queries += 1,
            Route::Cloud => next.cloud_queries += 1,
        }
        next.tokens_saved += decision.tokens_saved;
        next.cost_saved += decision.cost_saved;
        next.started = Some(self.started.unwrap_or(decision.timestamp));
        next.last_updated = Some(decision.timestamp);
        next
    }

    /// Replay a sequence of decisions onto an empty ledger
    pub fn from_decisions<I>(decisions: I) -> SavingsLedger
    where
        I: IntoIterator<Item = RoutingDecision>,
    {
        decisions
            .into_iter()
            .fold(SavingsLedger::new(), |ledger, decision| ledger.record(&decision))
    }

    /// Share of queries answered locally, in percent
    pub fn local_percentage(&self) -> f64 {
        if self.total_queries == 0 {
            return 0.0;
        }
        self.local_queries as f64 / self.total_queries as f64 * 100.0
    }

    pub fn is_consistent(&self) -> bool {
        self.total_queries == self.local_queries + self.cloud_queries
            && self.cost_saved.is_finite()
            && self.cost_saved >= 0.0
    }
}

/// On-disk home of the ledger
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the ledger. A missing file is an empty ledger; an unreadable,
    /// unparseable or inconsistent one is an error.
    pub fn load(&self) -> Result<SavingsLedger, EscalationError> {
        let read_err = |reason: String| EscalationError::LedgerRead {
            path: self.path.clone(),
            reason,
        };

        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(SavingsLedger::new())
            }
            Err(e) => return Err(read_err(e.to_string())),
        };

        let ledger: SavingsLedger =
            serde_json::from_str(&json).map_err(|e| read_err(e.to_string()))?;
        if !ledger.is_consistent() {
            return Err(read_err(format!(
                "total_queries {} != local {} + cloud {}",
                ledger.total_queries, ledger.local_queries, ledger.cloud_queries
            )));
        }
        Ok(ledger)
    }

    /// Load the ledger, falling back to a replay of `log` when the stored
    /// copy is unreadable. The rebuilt ledger is saved back best-effort.
    pub fn load_or_rebuild(&self, log: &DecisionLog) -> SavingsLedger {
        match self.load() {
            Ok(ledger) => ledger,
            Err(e) => {
                tracing::warn!("{}; rebuilding from decision log", e);
                match rebuild_ledger_from_log(log) {
                    Ok(ledger) => {
                        if let Err(e) = self.save(&ledger) {
                            tracing::warn!("Could not save rebuilt ledger: {}", e);
                        }
                        ledger
                    }
                    Err(e) => {
                        tracing::warn!("Could not rebuild ledger, starting empty: {}", e);
                        SavingsLedger::new()
                    }
                }
            }
        }
    }

    /// Rewrite the ledger atomically: lock, write a temp file, rename over.
    pub fn save(&self, ledger: &SavingsLedger) -> Result<(), EscalationError> {
        let write_err = |source: std::io::Error| EscalationError::LedgerWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let lock_path = self.path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(write_err)?;

        // Blocks until any other writer is done
        lock_file.lock_exclusive().map_err(write_err)?;

        let temp_path = self.path.with_extension("tmp");
        let json = serde_json::to_string_pretty(ledger).map_err(|e| write_err(e.into()))?;
        fs::write(&temp_path, json).map_err(write_err)?;
        fs::rename(&temp_path, &self.path).map_err(write_err)?;

        // Lock released when lock_file drops
        Ok(())
    }
}

/// Recompute the ledger from scratch by replaying the decision log.
/// Pure replay: running it any number of times gives the same ledger.
pub fn rebuild_ledger_from_log(log: &DecisionLog) -> Result<SavingsLedger, EscalationError> {
    let mut decisions = log.read_all()?;
    let ledger = SavingsLedger::from_decisions(decisions.by_ref());

    if decisions.skipped() > 0 {
        tracing::warn!(
            "Rebuilt ledger from {} skipping {} malformed lines",
            log.path().display(),
            decisions.skipped()
        );
    }
    tracing::info!(
        total = ledger.total_queries,
        local = ledger.local_queries,
        "Rebuilt savings ledger from decision log"
    );

    Ok(ledger)
}
