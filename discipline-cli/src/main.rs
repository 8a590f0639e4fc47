//! Discipline CLI — audit a trade batch against a plan, inspect history.
//!
//! Commands:
//! - `check` — run the rule checkers over a trades CSV and print the report
//! - `history` — per-regime summary and rolling score trend from the JSONL log
//! - `validate-plan` — load and validate a plan file without auditing anything

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::prelude::*;

use discipline_core::{HistoryStore, Report};
use discipline_runner::{
    audit_files, export_json, load_plan_validated, save_artifacts, score_trend,
    summary_by_regime, violations_by_type, AuditConfig, JsonlHistory, CLEAN_MESSAGE,
};

#[derive(Parser)]
#[command(
    name = "discipline",
    about = "Discipline — audit trades against your trading plan"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a trades CSV against a plan under the current market regime.
    Check {
        /// Trades CSV (date, symbol, side, entry_price, exit_price, shares, stop_price).
        #[arg(long)]
        trades: PathBuf,

        /// Plan file (.json or .toml).
        #[arg(long)]
        plan: PathBuf,

        /// Current market regime label, e.g. Risk-On.
        #[arg(long)]
        regime: String,

        /// Audit configuration TOML.
        #[arg(long)]
        config: Option<PathBuf>,

        /// History file. Overrides the config.
        #[arg(long)]
        history: Option<PathBuf>,

        /// Do not record this run in history.
        #[arg(long, default_value_t = false)]
        no_history: bool,

        /// Save report.json, violations.csv and report.md under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the report as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Evaluate trades in parallel.
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
    /// Summarize past audits by regime and show the score trend.
    History {
        /// Audit configuration TOML (for the history path).
        #[arg(long)]
        config: Option<PathBuf>,

        /// History file. Overrides the config.
        #[arg(long)]
        history: Option<PathBuf>,

        /// Rolling window for the score trend.
        #[arg(long, default_value_t = 5)]
        window: usize,
    },
    /// Load and validate a plan file.
    ValidatePlan {
        /// Plan file (.json or .toml).
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            trades,
            plan,
            regime,
            config,
            history,
            no_history,
            output_dir,
            json,
            parallel,
        } => {
            let mut audit_config = load_config(config.as_deref())?;
            if let Some(path) = history {
                audit_config.history.path = path;
            }
            if no_history {
                audit_config.history.enabled = false;
            }
            if parallel {
                audit_config.engine.parallel = true;
            }
            run_check(
                &trades,
                &plan,
                &regime,
                &audit_config,
                output_dir.as_deref(),
                json,
            )
        }
        Commands::History {
            config,
            history,
            window,
        } => {
            let audit_config = load_config(config.as_deref())?;
            let path = history.unwrap_or(audit_config.history.path);
            run_history(&path, window)
        }
        Commands::ValidatePlan { path } => run_validate_plan(&path),
    }
}

/// Log to stderr so `--json` output on stdout stays machine-readable.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "discipline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AuditConfig> {
    match path {
        Some(p) => AuditConfig::from_file(p)
            .with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(AuditConfig::default()),
    }
}

fn run_check(
    trades: &Path,
    plan: &Path,
    regime: &str,
    config: &AuditConfig,
    output_dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    let outcome = audit_files(trades, plan, regime, config)?;

    if let Some(warning) = &outcome.persistence_warning {
        eprintln!("Warning: report not recorded in history: {warning}");
    }

    if json {
        println!("{}", export_json(&outcome.report)?);
    } else {
        print_report(&outcome.report);
    }

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&outcome.report, dir)?;
        info!(dir = %run_dir.display(), "artifacts saved");
    }

    Ok(())
}

fn print_report(report: &Report) {
    let local = report.timestamp.with_timezone(&chrono::Local);

    println!();
    println!("=== Discipline Report ===");
    println!("Regime:            {}", report.regime_label);
    println!("Trades:            {}", report.total_trades);
    println!("Compliance Score:  {:.2}", report.compliance_score);
    println!("Regime Mismatch:   {:.2}", report.regime_mismatch_rate);
    println!("Violations:        {}", report.violations.len());
    println!("Generated:         {}", local.format("%Y-%m-%d %H:%M:%S"));
    println!("Input Hash:        {}", report.input_hash.short());
    println!();

    if report.is_clean() {
        println!("{CLEAN_MESSAGE}");
    } else {
        for v in &report.violations {
            println!("Trade #{} — {}: {}", v.trade_index, v.violation_type, v.detail);
        }
    }

    if !report.unenforced_constraints.is_empty() {
        println!();
        println!(
            "Not enforced (no checker): {}",
            report.unenforced_constraints.join(", ")
        );
    }
    println!();
}

fn run_history(path: &Path, window: usize) -> Result<()> {
    let history = JsonlHistory::new(path.to_path_buf());
    let entries = history
        .load_all()
        .with_context(|| format!("failed to read history {}", path.display()))?;

    if entries.is_empty() {
        println!("No audits recorded in {}", path.display());
        return Ok(());
    }

    println!("History: {} ({} audits)", path.display(), entries.len());
    println!();
    println!(
        "{:<16} {:>6} {:>10} {:>10} {:>10} {:>11}",
        "Regime", "Runs", "Mean", "Min", "Mismatch", "Violations"
    );
    println!("{}", "-".repeat(68));
    for (regime, s) in summary_by_regime(&entries) {
        println!(
            "{:<16} {:>6} {:>10.2} {:>10.2} {:>10.2} {:>11}",
            regime, s.runs, s.mean_score, s.min_score, s.mean_mismatch_rate, s.total_violations
        );
    }

    let by_type = violations_by_type(&entries);
    if !by_type.is_empty() {
        println!();
        for (label, count) in &by_type {
            println!("{label:<16} {count}");
        }
    }

    println!();
    println!("Score trend (rolling {}):", window.max(1));
    let trend = score_trend(&entries, window);
    for (entry, mean) in entries.iter().zip(&trend) {
        println!(
            "  {}  {:<16} {:.2}  (avg {:.2})",
            entry
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M"),
            entry.regime_label,
            entry.compliance_score,
            mean
        );
    }

    Ok(())
}

fn run_validate_plan(path: &Path) -> Result<()> {
    let plan = load_plan_validated(path)
        .with_context(|| format!("invalid plan {}", path.display()))?;

    println!("Plan OK: {}", path.display());
    println!("Allowed regimes:   {}", plan.allowed_regimes_display());
    println!("Stop required:     {}", plan.stop_required);
    for (name, value) in plan.numeric_constraints() {
        println!("{name:<18} {value} (not enforced)");
    }
    Ok(())
}
