//! Discipline Runner — everything around the core that touches the disk.
//!
//! This crate builds on `discipline-core` to provide:
//! - Trades CSV and plan (JSON/TOML) loading
//! - TOML audit configuration
//! - JSONL history store plus per-regime summaries and score trends
//! - JSON, CSV and Markdown report export
//! - `audit_files`, the one-call file-to-report entry point

pub mod audit;
pub mod config;
pub mod export;
pub mod history;
pub mod loader;

pub use audit::{audit_files, AuditError};
pub use config::{AuditConfig, AuditConfigError, EngineConfig, HistoryConfig, TradesConfig};
pub use export::{
    export_json, export_violations_csv, import_json, load_artifacts, render_markdown,
    save_artifacts, CLEAN_MESSAGE,
};
pub use history::{score_trend, summary_by_regime, violations_by_type, JsonlHistory, RegimeSummary};
pub use loader::{
    load_plan, load_plan_validated, load_trades_csv, parse_plan_str, read_trades_csv, LoadError,
    PlanFormat,
};
