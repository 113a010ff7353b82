// Metrics module
// Savings accounting, the decision log, the ledger and dashboard summaries

mod dashboard;
mod decision_log;
mod ledger;
mod savings;

pub use dashboard::{BandCounts, DashboardSummary};
pub use decision_log::{DecisionIter, DecisionLog};
pub use ledger::{rebuild_ledger_from_log, LedgerStore, SavingsLedger};
pub use savings::{Pricing, Savings, SavingsCalculator};
