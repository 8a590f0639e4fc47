//! Rule checkers — pure per-trade compliance rules.
//!
//! Each checker inspects one trade against one aspect of the plan and yields
//! at most one violation. Checkers are registered in a `RuleSet`; adding a
//! rule means adding an implementation, not editing existing ones.

pub mod regime;
pub mod stop;

use crate::domain::{Plan, Trade, Violation};

/// Trait for compliance rules.
///
/// # Architecture invariant
/// Checkers are pure: they read the trade, plan and regime label and write
/// nothing. This is what makes per-trade evaluation order-independent.
pub trait RuleChecker: Send + Sync {
    /// Stable identifier (e.g., "regime_allowed").
    fn name(&self) -> &str;

    fn check(&self, trade: &Trade, plan: &Plan, regime_label: &str) -> Option<Violation>;
}

/// Ordered registry of rule checkers.
///
/// Registration order is the order in which a single trade's violations
/// appear in the report.
pub struct RuleSet {
    checkers: Vec<Box<dyn RuleChecker>>,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self {
            checkers: Vec::new(),
        }
    }

    /// The two mandatory rules: regime gate, then stop requirement.
    pub fn standard() -> Self {
        Self::empty()
            .with(regime::RegimeAllowed)
            .with(stop::StopRequired)
    }

    pub fn with(mut self, checker: impl RuleChecker + 'static) -> Self {
        self.register(checker);
        self
    }

    pub fn register(&mut self, checker: impl RuleChecker + 'static) {
        self.checkers.push(Box::new(checker));
    }

    pub fn names(&self) -> Vec<&str> {
        self.checkers.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }

    /// Apply every checker to one trade. No short-circuiting.
    pub fn check_trade(&self, trade: &Trade, plan: &Plan, regime_label: &str) -> Vec<Violation> {
        self.checkers
            .iter()
            .filter_map(|c| c.check(trade, plan, regime_label))
            .collect()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

pub use regime::RegimeAllowed;
pub use stop::StopRequired;
