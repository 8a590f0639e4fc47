//! Discipline agent — validates inputs, runs every rule over every trade,
//! builds the report and hands a summary to the history store.
//!
//! Two entry points:
//! - `run()`: loosely-typed rows + plan document. Validates, evaluates, records.
//! - `evaluate()`: already-validated trades + plan. Pure; no history.

use std::sync::Arc;

use chrono::Utc;
use rayon::prelude::*;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{validate_rows, ConfigError, DataError, Plan, Report, Trade, TradeRow, Violation};
use crate::fingerprint::input_hash;
use crate::history::{HistoryEntry, HistoryStore, PersistenceError};
use crate::rules::RuleSet;
use crate::scoring::{aggregate, ReportContext};

/// Fatal errors for a run. No partial report is produced.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// A completed run: the report, plus a persistence warning if recording it
/// to history failed. The warning never changes the report.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: Report,
    pub persistence_warning: Option<PersistenceError>,
}

/// Orchestrates one audit. Holds no per-run state, so a single agent can be
/// reused across runs.
pub struct DisciplineAgent {
    rules: RuleSet,
    history: Option<Arc<dyn HistoryStore>>,
    parallel: bool,
    date_formats: Vec<String>,
}

impl Default for DisciplineAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl DisciplineAgent {
    /// Standard rules, no history, sequential evaluation.
    pub fn new() -> Self {
        Self {
            rules: RuleSet::standard(),
            history: None,
            parallel: false,
            date_formats: Vec::new(),
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_history(mut self, store: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(store);
        self
    }

    /// Evaluate trades on the rayon pool. Violation order is unchanged.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Date formats for row validation; empty means the built-in defaults.
    pub fn with_date_formats(mut self, formats: Vec<String>) -> Self {
        self.date_formats = formats;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Full run over a plan document (decoded JSON/TOML).
    pub fn run(
        &self,
        rows: &[TradeRow],
        plan: &Value,
        regime_label: &str,
    ) -> Result<RunOutcome, AgentError> {
        let plan = Plan::from_value(plan)?;
        self.run_with_plan(rows, &plan, regime_label)
    }

    /// Full run over a plan built in code.
    ///
    /// Plan validation happens once, before any row is looked at. Rows are
    /// validated fail-fast: the first bad row aborts the run.
    pub fn run_with_plan(
        &self,
        rows: &[TradeRow],
        plan: &Plan,
        regime_label: &str,
    ) -> Result<RunOutcome, AgentError> {
        plan.validate()?;
        debug!(
            allowed = %plan.allowed_regimes_display(),
            stop_required = plan.stop_required,
            "plan validated"
        );

        let trades = validate_rows(rows, &self.date_formats)?;
        debug!(rows = trades.len(), "trade rows validated");

        let report = self.evaluate(&trades, plan, regime_label);
        let persistence_warning = self.record(&report);

        Ok(RunOutcome {
            report,
            persistence_warning,
        })
    }

    /// Apply every registered rule to every trade and score the result.
    pub fn evaluate(&self, trades: &[Trade], plan: &Plan, regime_label: &str) -> Report {
        let unenforced_constraints: Vec<String> = plan
            .numeric_constraints()
            .into_iter()
            .map(|(name, value)| {
                warn!(
                    constraint = name,
                    value, "plan constraint has no checker; not enforced"
                );
                name.to_string()
            })
            .collect();

        let per_trade: Vec<Vec<Violation>> = if self.parallel {
            trades
                .par_iter()
                .map(|t| self.rules.check_trade(t, plan, regime_label))
                .collect()
        } else {
            trades
                .iter()
                .map(|t| self.rules.check_trade(t, plan, regime_label))
                .collect()
        };

        let context = ReportContext {
            regime_label: regime_label.to_string(),
            input_hash: input_hash(trades, plan, regime_label),
            unenforced_constraints,
            timestamp: Utc::now(),
        };
        let report = aggregate(per_trade, context);

        info!(
            regime = regime_label,
            trades = report.total_trades,
            violations = report.violations.len(),
            score = report.compliance_score,
            mismatch_rate = report.regime_mismatch_rate,
            "discipline report built"
        );
        report
    }

    fn record(&self, report: &Report) -> Option<PersistenceError> {
        let store = self.history.as_ref()?;
        match store.append(&HistoryEntry::from_report(report)) {
            Ok(()) => {
                debug!(input_hash = %report.input_hash.short(), "history entry appended");
                None
            }
            Err(e) => {
                warn!(error = %e, "failed to record history entry; report unaffected");
                Some(e)
            }
        }
    }
}
