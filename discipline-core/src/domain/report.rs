//! Discipline report — the immutable outcome of one audit run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ids::InputHash;
use super::violation::{Violation, ViolationType};

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Structured compliance report. Built once by the scoring aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    // ── Scores ──
    /// In `[0.0, 1.0]`; `1.0` for an empty batch.
    pub compliance_score: f64,
    /// Share of trades carrying a regime mismatch, in `[0.0, 1.0]`.
    pub regime_mismatch_rate: f64,

    // ── Evidence ──
    /// Ordered by trade index.
    pub violations: Vec<Violation>,
    pub total_trades: usize,

    // ── Context ──
    pub regime_label: String,
    pub timestamp: DateTime<Utc>,
    pub input_hash: InputHash,
    /// Plan constraints that were set but have no checker behind them.
    #[serde(default)]
    pub unenforced_constraints: Vec<String>,
}

impl Report {
    /// Violation counts per type, in `ViolationType` order.
    pub fn violation_summary(&self) -> BTreeMap<ViolationType, usize> {
        let mut summary = BTreeMap::new();
        for v in &self.violations {
            *summary.entry(v.violation_type).or_insert(0) += 1;
        }
        summary
    }

    pub fn count_of(&self, violation_type: ViolationType) -> usize {
        self.violations
            .iter()
            .filter(|v| v.violation_type == violation_type)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations raised against one trade.
    pub fn violations_for(&self, trade_index: usize) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(move |v| v.trade_index == trade_index)
    }

    /// Equality ignoring the creation timestamp.
    pub fn same_outcome(&self, other: &Report) -> bool {
        self.compliance_score == other.compliance_score
            && self.regime_mismatch_rate == other.regime_mismatch_rate
            && self.violations == other.violations
            && self.total_trades == other.total_trades
            && self.regime_label == other.regime_label
            && self.input_hash == other.input_hash
            && self.unenforced_constraints == other.unenforced_constraints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Report {
        Report {
            schema_version: SCHEMA_VERSION,
            compliance_score: 0.0,
            regime_mismatch_rate: 1.0,
            violations: vec![
                Violation::new(0, ViolationType::RegimeMismatch, "r"),
                Violation::new(1, ViolationType::RegimeMismatch, "r"),
                Violation::new(1, ViolationType::MissingStop, "s"),
            ],
            total_trades: 2,
            regime_label: "Risk-Off".into(),
            timestamp: Utc::now(),
            input_hash: InputHash::from_bytes(b"sample"),
            unenforced_constraints: Vec::new(),
        }
    }

    #[test]
    fn summary_counts_by_type() {
        let summary = sample().violation_summary();
        assert_eq!(summary[&ViolationType::RegimeMismatch], 2);
        assert_eq!(summary[&ViolationType::MissingStop], 1);
    }

    #[test]
    fn violations_for_trade() {
        let report = sample();
        assert_eq!(report.violations_for(1).count(), 2);
        assert_eq!(report.violations_for(5).count(), 0);
    }

    #[test]
    fn same_outcome_ignores_timestamp() {
        let a = sample();
        let mut b = a.clone();
        b.timestamp = a.timestamp + chrono::Duration::seconds(30);
        assert!(a.same_outcome(&b));
        b.compliance_score = 0.5;
        assert!(!a.same_outcome(&b));
    }

    #[test]
    fn missing_schema_version_defaults() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value.as_object_mut().unwrap().remove("schema_version");
        let report: Report = serde_json::from_value(value).unwrap();
        assert_eq!(report.schema_version, SCHEMA_VERSION);
    }
}
