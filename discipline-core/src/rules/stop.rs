//! Stop requirement — every trade must carry a protective stop when the plan says so.

use crate::domain::{Plan, Trade, Violation, ViolationType};

use super::RuleChecker;

/// Flags a trade whose stop is absent, zero, negative or non-finite while
/// `plan.stop_required` is set. Never fires otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopRequired;

impl RuleChecker for StopRequired {
    fn name(&self) -> &str {
        "stop_required"
    }

    fn check(&self, trade: &Trade, plan: &Plan, _regime_label: &str) -> Option<Violation> {
        if !plan.stop_required || trade.has_valid_stop() {
            return None;
        }
        let reason = match trade.stop_price {
            None => "not provided".to_string(),
            Some(p) => format!("invalid stop price {p}"),
        };
        Some(Violation::new(
            trade.index,
            ViolationType::MissingStop,
            format!(
                "Stop required but {reason} ({} {} on {})",
                trade.side, trade.symbol, trade.date
            ),
        ))
    }
}
