//! Discipline Core — rule evaluation and scoring for trading-plan compliance.
//!
//! This crate contains the heart of the auditor:
//! - Domain types (trade rows, trades, plans, violations, reports)
//! - Structural validation of plans and trade rows
//! - Pure per-trade rule checkers behind the `RuleChecker` trait
//! - Scoring aggregator producing the `Report`
//! - `DisciplineAgent` orchestration with an injected history store
//!
//! No filesystem or network access happens here.

pub mod agent;
pub mod domain;
pub mod fingerprint;
pub mod history;
pub mod rules;
pub mod scoring;

pub use agent::{AgentError, DisciplineAgent, RunOutcome};
pub use domain::{
    ConfigError, DataError, InputHash, Plan, Report, Side, Trade, TradeRow, Violation,
    ViolationType,
};
pub use history::{HistoryEntry, HistoryStore, MemoryHistory, PersistenceError};
pub use rules::{RuleChecker, RuleSet};
