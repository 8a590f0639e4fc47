//! Report export — JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: the full report, schema-versioned; unknown versions are
//!   rejected on load
//! - **CSV**: the violation tape for spreadsheets
//! - **Markdown**: a human-readable report

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use discipline_core::domain::SCHEMA_VERSION;
use discipline_core::{Report, Violation};

/// Printed (and written to Markdown) when a report has no violations.
pub const CLEAN_MESSAGE: &str = "No violations detected. Discipline intact.";

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `Report` to pretty JSON.
pub fn export_json(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize Report to JSON")
}

/// Deserialize a `Report` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<Report> {
    let report: Report =
        serde_json::from_str(json).context("failed to deserialize Report from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export violations as CSV.
///
/// Columns: trade_index, violation_type, detail
pub fn export_violations_csv(violations: &[Violation]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["trade_index", "violation_type", "detail"])?;
    for v in violations {
        wtr.write_record([
            v.trade_index.to_string().as_str(),
            v.violation_type.label(),
            v.detail.as_str(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single audit.
///
/// Creates `{regime}_{timestamp}_{hash}/` under `output_dir` containing
/// `report.json`, `violations.csv` and `report.md`. An existing directory is
/// never reused; a numeric suffix is added instead. Returns the directory.
pub fn save_artifacts(report: &Report, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let dirname = format!(
        "{}_{}_{}",
        sanitize_component(&report.regime_label),
        report.timestamp.format("%Y%m%d_%H%M%S_%3f"),
        sanitize_component(report.input_hash.short())
    );
    let run_dir = create_fresh_dir(output_dir, &dirname)?;

    let json = export_json(report)?;
    write_artifact(&run_dir.join("report.json"), &json)?;

    let csv = export_violations_csv(&report.violations)?;
    write_artifact(&run_dir.join("violations.csv"), &csv)?;

    write_artifact(&run_dir.join("report.md"), &render_markdown(report))?;

    Ok(run_dir)
}

fn create_fresh_dir(parent: &Path, dirname: &str) -> Result<PathBuf> {
    let mut candidate = parent.join(dirname);
    let mut attempt = 1;
    loop {
        match std::fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                attempt += 1;
                candidate = parent.join(format!("{dirname}-{attempt}"));
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to create artifact dir: {}", candidate.display())
                })
            }
        }
    }
}

/// Load a `Report` from an artifact directory's report.json.
pub fn load_artifacts(dir: &Path) -> Result<Report> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

fn write_artifact(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Regime labels are free text; keep directory names portable.
fn sanitize_component(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "regime".to_string()
    } else {
        cleaned
    }
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report for a single audit.
pub fn render_markdown(report: &Report) -> String {
    let mut md = String::with_capacity(1024);

    md.push_str("# Discipline Report\n\n");

    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Regime | {} |\n", escape_cell(&report.regime_label)));
    md.push_str(&format!(
        "| Compliance Score | {:.2} |\n",
        report.compliance_score
    ));
    md.push_str(&format!(
        "| Regime Mismatch Rate | {:.2} |\n",
        report.regime_mismatch_rate
    ));
    md.push_str(&format!("| Trades | {} |\n", report.total_trades));
    md.push_str(&format!("| Violations | {} |\n", report.violations.len()));
    md.push_str(&format!("| Input Hash | {} |\n", report.input_hash.short()));
    md.push_str(&format!(
        "| Generated | {} |\n",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push('\n');

    md.push_str("## Violations\n\n");
    if report.is_clean() {
        md.push_str(CLEAN_MESSAGE);
        md.push_str("\n\n");
    } else {
        md.push_str("| Type | Count |\n");
        md.push_str("| --- | --- |\n");
        for (violation_type, count) in report.violation_summary() {
            md.push_str(&format!("| {} | {} |\n", violation_type, count));
        }
        md.push('\n');

        md.push_str("| Trade | Type | Detail |\n");
        md.push_str("| --- | --- | --- |\n");
        for v in &report.violations {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                v.trade_index,
                v.violation_type,
                escape_cell(&v.detail)
            ));
        }
        md.push('\n');
    }

    if !report.unenforced_constraints.is_empty() {
        md.push_str("## Unenforced Constraints\n\n");
        md.push_str("Set in the plan but not checked by any rule:\n\n");
        for name in &report.unenforced_constraints {
            md.push_str(&format!("- `{}`\n", name));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|")
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use discipline_core::{InputHash, ViolationType};
    use tempfile::TempDir;

    fn report(violations: Vec<Violation>) -> Report {
        Report {
            schema_version: SCHEMA_VERSION,
            compliance_score: if violations.is_empty() { 1.0 } else { 0.0 },
            regime_mismatch_rate: if violations.is_empty() { 0.0 } else { 1.0 },
            violations,
            total_trades: 2,
            regime_label: "Risk-Off".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 0).unwrap(),
            input_hash: InputHash::from_bytes(b"export"),
            unenforced_constraints: Vec::new(),
        }
    }

    fn dirty() -> Report {
        report(vec![
            Violation::new(0, ViolationType::RegimeMismatch, "Trade taken during Risk-Off regime; plan allows [Risk-On]"),
            Violation::new(1, ViolationType::RegimeMismatch, "Trade taken during Risk-Off regime; plan allows [Risk-On]"),
            Violation::new(1, ViolationType::MissingStop, "Stop required but not provided (LONG SPY on 2024-06-03)"),
        ])
    }

    #[test]
    fn json_roundtrip() {
        let report = dirty();
        let restored = import_json(&export_json(&report).unwrap()).unwrap();
        assert_eq!(restored, report);
    }

    #[test]
    fn future_schema_version_rejected() {
        let mut r = dirty();
        r.schema_version = SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&r).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn violations_csv_has_header_and_rows() {
        let csv = export_violations_csv(&dirty().violations).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "trade_index,violation_type,detail");
        assert_eq!(lines.len(), 4);
        assert!(lines[3].starts_with("1,Missing Stop,"));
    }

    #[test]
    fn violations_csv_quotes_commas() {
        let v = vec![Violation::new(0, ViolationType::MissingStop, "a, b")];
        let csv = export_violations_csv(&v).unwrap();
        assert!(csv.contains("\"a, b\""));
    }

    #[test]
    fn markdown_clean_report() {
        let md = render_markdown(&report(Vec::new()));
        assert!(md.contains("# Discipline Report"));
        assert!(md.contains("| Compliance Score | 1.00 |"));
        assert!(md.contains(CLEAN_MESSAGE));
        assert!(!md.contains("Unenforced"));
    }

    #[test]
    fn markdown_lists_violations_and_constraints() {
        let mut r = dirty();
        r.unenforced_constraints = vec!["max_stop_pct".into()];
        let md = render_markdown(&r);
        assert!(md.contains("| Regime Mismatch | 2 |"));
        assert!(md.contains("| Missing Stop | 1 |"));
        assert!(md.contains("| 1 | Missing Stop | Stop required but not provided"));
        assert!(md.contains("- `max_stop_pct`"));
        assert!(!md.contains(CLEAN_MESSAGE));
    }

    #[test]
    fn save_and_load_artifacts() {
        let tmp = TempDir::new().unwrap();
        let r = dirty();
        let dir = save_artifacts(&r, tmp.path()).unwrap();

        let name = dir.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("Risk-Off_20240603_143000_000_"), "{name}");
        assert!(name.ends_with(r.input_hash.short()), "{name}");
        assert!(dir.join("report.json").exists());
        assert!(dir.join("violations.csv").exists());
        assert!(dir.join("report.md").exists());
        assert_eq!(load_artifacts(&dir).unwrap(), r);
    }

    #[test]
    fn runs_in_the_same_second_keep_separate_artifacts() {
        let tmp = TempDir::new().unwrap();
        let first = report(Vec::new());
        let mut second = dirty();
        second.compliance_score = 0.5;
        second.timestamp = first.timestamp + chrono::Duration::milliseconds(500);

        let a = save_artifacts(&first, tmp.path()).unwrap();
        let b = save_artifacts(&second, tmp.path()).unwrap();
        assert_ne!(a, b);
        assert_eq!(load_artifacts(&a).unwrap().compliance_score, 1.0);
        assert_eq!(load_artifacts(&b).unwrap().compliance_score, 0.5);
    }

    #[test]
    fn identical_report_saved_twice_is_not_overwritten() {
        let tmp = TempDir::new().unwrap();
        let r = dirty();
        let a = save_artifacts(&r, tmp.path()).unwrap();
        std::fs::write(a.join("notes.txt"), "reviewed").unwrap();

        let b = save_artifacts(&r, tmp.path()).unwrap();
        assert_ne!(a, b);
        assert!(b.file_name().unwrap().to_str().unwrap().ends_with("-2"));
        assert!(a.join("notes.txt").exists());
        assert_eq!(load_artifacts(&a).unwrap(), r);
    }

    #[test]
    fn regime_label_sanitized_for_directory() {
        assert_eq!(sanitize_component("Risk On/Off"), "Risk_On_Off");
        assert_eq!(sanitize_component(""), "regime");
    }
}
