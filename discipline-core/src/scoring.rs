//! Scoring aggregator — folds per-trade violations into a `Report`.

use chrono::{DateTime, Utc};

use crate::domain::{InputHash, Report, Violation, ViolationType, SCHEMA_VERSION};

/// Everything the report needs besides the violations themselves.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub regime_label: String,
    pub input_hash: InputHash,
    pub unenforced_constraints: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// `1.0 - violations / trades`, clamped to `[0.0, 1.0]`; `1.0` for no trades.
pub fn compliance_score(violation_count: usize, total_trades: usize) -> f64 {
    if total_trades == 0 {
        return 1.0;
    }
    (1.0 - violation_count as f64 / total_trades as f64).clamp(0.0, 1.0)
}

/// Share of trades with a regime mismatch; `0.0` for no trades.
pub fn regime_mismatch_rate(violations: &[Violation], total_trades: usize) -> f64 {
    if total_trades == 0 {
        return 0.0;
    }
    let mismatches = violations
        .iter()
        .filter(|v| v.violation_type == ViolationType::RegimeMismatch)
        .count();
    mismatches as f64 / total_trades as f64
}

/// Build the report from one violation list per trade, in trade order.
///
/// `per_trade.len()` is the trade count; empty inner lists are trades that
/// passed every rule.
pub fn aggregate(per_trade: Vec<Vec<Violation>>, context: ReportContext) -> Report {
    let total_trades = per_trade.len();
    let violations: Vec<Violation> = per_trade.into_iter().flatten().collect();

    Report {
        schema_version: SCHEMA_VERSION,
        compliance_score: compliance_score(violations.len(), total_trades),
        regime_mismatch_rate: regime_mismatch_rate(&violations, total_trades),
        violations,
        total_trades,
        regime_label: context.regime_label,
        timestamp: context.timestamp,
        input_hash: context.input_hash,
        unenforced_constraints: context.unenforced_constraints,
    }
}
