//! History store contract — append-only log of past report summaries.
//!
//! The agent receives a store at construction time; it never reaches for a
//! global. The core only ships an in-memory store. File-backed stores live in
//! the runner crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

use crate::domain::{InputHash, Report};

/// A compact snapshot of one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub regime_label: String,
    pub compliance_score: f64,
    pub regime_mismatch_rate: f64,
    pub violation_count: usize,
    pub total_trades: usize,
    pub input_hash: InputHash,
    /// Violation count keyed by type label ("Missing Stop", ...).
    #[serde(default)]
    pub violations_by_type: BTreeMap<String, usize>,
}

impl HistoryEntry {
    pub fn from_report(report: &Report) -> Self {
        Self {
            timestamp: report.timestamp,
            regime_label: report.regime_label.clone(),
            compliance_score: report.compliance_score,
            regime_mismatch_rate: report.regime_mismatch_rate,
            violation_count: report.violations.len(),
            total_trades: report.total_trades,
            input_hash: report.input_hash.clone(),
            violations_by_type: report
                .violation_summary()
                .into_iter()
                .map(|(t, n)| (t.label().to_string(), n))
                .collect(),
        }
    }
}

/// Failure to persist or read history. Never fatal to a compliance run.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("history I/O error at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("history serialization error: {0}")]
    Serialization(String),

    #[error("history store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only history backend.
///
/// `load_all` returns entries oldest first. A store that was never written to
/// returns an empty list, not an error.
pub trait HistoryStore: Send + Sync {
    fn append(&self, entry: &HistoryEntry) -> Result<(), PersistenceError>;

    fn load_all(&self) -> Result<Vec<HistoryEntry>, PersistenceError>;
}

/// Process-local store. Used by tests and by embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistoryStore for MemoryHistory {
    fn append(&self, entry: &HistoryEntry) -> Result<(), PersistenceError> {
        self.entries
            .lock()
            .map_err(|_| PersistenceError::Unavailable("history lock poisoned".into()))?
            .push(entry.clone());
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<HistoryEntry>, PersistenceError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| PersistenceError::Unavailable("history lock poisoned".into()))?;
        Ok(entries.clone())
    }
}
