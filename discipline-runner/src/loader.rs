//! Input loading — trades CSV and plan documents (JSON or TOML).
//!
//! Loading only decodes files into loosely-typed structures (`TradeRow`,
//! `serde_json::Value`). Field-level validation belongs to the core, which can
//! name the offending row and field.

use std::io::Read;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use discipline_core::{ConfigError, Plan, TradeRow};

/// Columns a trades CSV must declare. `stop_price` is optional.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "date",
    "symbol",
    "side",
    "entry_price",
    "exit_price",
    "shares",
];

/// Errors from the input loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("trades CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("trades CSV missing required column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("plan JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("plan TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported plan format '{0}' (expected .json or .toml)")]
    UnsupportedPlanFormat(String),

    #[error("invalid plan: {0}")]
    Plan(#[from] ConfigError),
}

/// Plan document encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    Json,
    Toml,
}

impl PlanFormat {
    /// Pick the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(PlanFormat::Json),
            "toml" => Ok(PlanFormat::Toml),
            _ => Err(LoadError::UnsupportedPlanFormat(path.display().to_string())),
        }
    }
}

/// Load trade rows from a CSV file.
pub fn load_trades_csv(path: &Path) -> Result<Vec<TradeRow>, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_trades_csv(file)
}

/// Decode trade rows from any CSV source with a header row.
///
/// Cells and headers are trimmed; empty cells become `None`; unknown columns
/// are ignored.
pub fn read_trades_csv<R: Read>(reader: R) -> Result<Vec<TradeRow>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if let Some(column) = REQUIRED_COLUMNS
        .iter()
        .copied()
        .find(|col| !headers.iter().any(|h| h == *col))
    {
        return Err(LoadError::MissingColumn { column });
    }

    let rows = rdr
        .deserialize::<TradeRow>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Decode a plan document. The result still needs `Plan::from_value`.
pub fn parse_plan_str(content: &str, format: PlanFormat) -> Result<Value, LoadError> {
    match format {
        PlanFormat::Json => Ok(serde_json::from_str(content)?),
        PlanFormat::Toml => Ok(toml::from_str(content)?),
    }
}

/// Load a plan document from a `.json` or `.toml` file.
pub fn load_plan(path: &Path) -> Result<Value, LoadError> {
    let format = PlanFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_plan_str(&content, format)
}

/// Load and validate a plan in one step.
pub fn load_plan_validated(path: &Path) -> Result<Plan, LoadError> {
    let doc = load_plan(path)?;
    Ok(Plan::from_value(&doc)?)
}
