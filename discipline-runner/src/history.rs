//! Audit history — JSONL append-only persistence of report summaries.
//!
//! One JSON object per line. Each append writes a single complete line and
//! syncs it, so a crash can at worst leave a torn trailing line; readers skip
//! it and the next append starts on a fresh line. Earlier entries are never
//! rewritten.
//!
//! The history enables trend analysis: "is my discipline improving, and in
//! which regimes do I break the plan?"

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use discipline_core::{HistoryEntry, HistoryStore, PersistenceError};

/// JSONL history file manager.
#[derive(Debug, Clone)]
pub struct JsonlHistory {
    path: PathBuf,
}

impl JsonlHistory {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path to the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the current file size in bytes (0 if the file does not exist yet).
    pub fn file_size_bytes(&self) -> Result<u64, PersistenceError> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        let mut buf = String::with_capacity(line.len() + 2);
        if ends_with_torn_line(&mut file)? {
            buf.push('\n');
        }
        buf.push_str(line);
        buf.push('\n');

        file.write_all(buf.as_bytes())?;
        file.flush()?;
        file.sync_data()
    }
}

/// True if the file is non-empty and its last byte is not a newline.
fn ends_with_torn_line(file: &mut File) -> io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl HistoryStore for JsonlHistory {
    fn append(&self, entry: &HistoryEntry) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(entry)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        self.write_line(&json).map_err(|e| self.io_error(e))
    }

    /// Read all entries, oldest first.
    ///
    /// Lines are split on raw bytes, so a torn line (even one cut inside a
    /// multi-byte character) is skipped like any other malformed line.
    fn load_all(&self) -> Result<Vec<HistoryEntry>, PersistenceError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        let reader = io::BufReader::new(file);
        let mut entries = Vec::new();

        for (line_no, line) in reader.split(b'\n').enumerate() {
            let line = line.map_err(|e| self.io_error(e))?;
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<HistoryEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = line_no + 1,
                    error = %e,
                    "skipping malformed history line"
                ),
            }
        }

        Ok(entries)
    }
}

/// Per-regime aggregate over history entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeSummary {
    pub runs: usize,
    pub mean_score: f64,
    pub min_score: f64,
    pub mean_mismatch_rate: f64,
    pub total_trades: usize,
    pub total_violations: usize,
}

/// Group history by regime label and summarize each group.
pub fn summary_by_regime(entries: &[HistoryEntry]) -> BTreeMap<String, RegimeSummary> {
    let mut groups: BTreeMap<String, Vec<&HistoryEntry>> = BTreeMap::new();
    for entry in entries {
        groups
            .entry(entry.regime_label.clone())
            .or_default()
            .push(entry);
    }

    groups
        .into_iter()
        .map(|(regime, group)| {
            let n = group.len() as f64;
            let mean_score = group.iter().map(|e| e.compliance_score).sum::<f64>() / n;
            let min_score = group
                .iter()
                .map(|e| e.compliance_score)
                .fold(f64::INFINITY, f64::min);
            let mean_mismatch_rate =
                group.iter().map(|e| e.regime_mismatch_rate).sum::<f64>() / n;

            (
                regime,
                RegimeSummary {
                    runs: group.len(),
                    mean_score,
                    min_score,
                    mean_mismatch_rate,
                    total_trades: group.iter().map(|e| e.total_trades).sum(),
                    total_violations: group.iter().map(|e| e.violation_count).sum(),
                },
            )
        })
        .collect()
}

/// Rolling mean of the compliance score, one value per entry (oldest first).
///
/// Early entries average over however many runs exist so far. A `window` of
/// 0 is treated as 1.
pub fn score_trend(entries: &[HistoryEntry], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..entries.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &entries[start..=i];
            slice.iter().map(|e| e.compliance_score).sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Violation counts per type label across all entries.
pub fn violations_by_type(entries: &[HistoryEntry]) -> BTreeMap<String, usize> {
    let mut totals = BTreeMap::new();
    for entry in entries {
        for (label, count) in &entry.violations_by_type {
            *totals.entry(label.clone()).or_insert(0) += count;
        }
    }
    totals
}

// ─── Tests ───────────────────────────────────────────────────────────
