//! Violations — a single detected deviation from the plan for one trade.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of plan deviation. New rules add a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationType {
    RegimeMismatch,
    MissingStop,
}

impl ViolationType {
    /// Human-readable label used in reports and history summaries.
    pub fn label(&self) -> &'static str {
        match self {
            ViolationType::RegimeMismatch => "Regime Mismatch",
            ViolationType::MissingStop => "Missing Stop",
        }
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Created by a rule checker, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub trade_index: usize,
    pub violation_type: ViolationType,
    pub detail: String,
}

impl Violation {
    pub fn new(trade_index: usize, violation_type: ViolationType, detail: impl Into<String>) -> Self {
        Self {
            trade_index,
            violation_type,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(ViolationType::RegimeMismatch.to_string(), "Regime Mismatch");
        assert_eq!(ViolationType::MissingStop.to_string(), "Missing Stop");
    }

    #[test]
    fn serializes_variant_name() {
        let v = Violation::new(2, ViolationType::MissingStop, "no stop");
        let json = serde_json::to_string(&v).unwrap();
        assert!(json.contains("\"MissingStop\""));
        assert!(json.contains("\"trade_index\":2"));
    }
}
