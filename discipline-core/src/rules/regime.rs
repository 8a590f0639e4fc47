//! Regime gate — trading is only permitted in regimes the plan allows.

use crate::domain::{Plan, Trade, Violation, ViolationType};

use super::RuleChecker;

/// Flags every trade when the declared regime is not in `plan.allowed_regimes`.
///
/// Regime-global: the trade's own attributes are never inspected, so every
/// trade in a disallowed regime carries the same detail text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegimeAllowed;

impl RuleChecker for RegimeAllowed {
    fn name(&self) -> &str {
        "regime_allowed"
    }

    fn check(&self, trade: &Trade, plan: &Plan, regime_label: &str) -> Option<Violation> {
        if plan.allows(regime_label) {
            return None;
        }
        Some(Violation::new(
            trade.index,
            ViolationType::RegimeMismatch,
            format!(
                "Trade taken during {regime_label} regime; plan allows {}",
                plan.allowed_regimes_display()
            ),
        ))
    }
}
