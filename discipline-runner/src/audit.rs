//! File-level audit: load inputs from disk, run the agent, return the outcome.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use discipline_core::{AgentError, RunOutcome};

use crate::config::AuditConfig;
use crate::loader::{load_plan, load_trades_csv, LoadError};

#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl AuditError {
    /// True for plan problems (as opposed to bad trade data or I/O).
    ///
    /// Plan documents are decoded here and validated by the agent, so a plan
    /// problem always surfaces as `AgentError::Config`.
    pub fn is_config_error(&self) -> bool {
        matches!(self, AuditError::Agent(AgentError::Config(_)))
    }
}

/// Audit a trades CSV against a plan file under the given regime.
///
/// The plan document is decoded before the trades file is opened, so an
/// undecodable plan is reported even when the trades file is also broken.
pub fn audit_files(
    trades_path: &Path,
    plan_path: &Path,
    regime_label: &str,
    config: &AuditConfig,
) -> Result<RunOutcome, AuditError> {
    let plan = load_plan(plan_path)?;
    debug!(path = %plan_path.display(), "plan document loaded");

    let rows = load_trades_csv(trades_path)?;
    debug!(path = %trades_path.display(), rows = rows.len(), "trade rows loaded");

    let outcome = config.build_agent().run(&rows, &plan, regime_label)?;
    info!(
        trades = %trades_path.display(),
        regime = regime_label,
        score = outcome.report.compliance_score,
        "audit complete"
    );
    Ok(outcome)
}
