//! Trade records — the raw row as supplied by a parser and the validated trade.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Date formats tried, in order, when no explicit list is configured.
pub const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Datetime formats accepted as a fallback; the time component is discarded.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Cell values that mean "no stop was set".
const NULL_MARKERS: &[&str] = &["", "nan", "null", "none", "n/a", "na"];

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Parse `LONG` / `SHORT`, case-insensitive, surrounding whitespace ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("long") {
            Some(Side::Long)
        } else if trimmed.eq_ignore_ascii_case("short") {
            Some(Side::Short)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "LONG",
            Side::Short => "SHORT",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structurally valid trade. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// 0-based position in input order.
    pub index: usize,
    pub date: NaiveDate,
    pub symbol: String,
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub shares: f64,
    pub stop_price: Option<f64>,
}

impl Trade {
    /// True when a stop is present and is a usable price (finite, > 0).
    pub fn has_valid_stop(&self) -> bool {
        matches!(self.stop_price, Some(p) if p.is_finite() && p > 0.0)
    }
}

/// A row exactly as a tabular parser hands it over: every cell optional text.
///
/// Keeping the cells untyped lets validation name the offending field and row
/// instead of failing inside the parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeRow {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub entry_price: Option<String>,
    #[serde(default)]
    pub exit_price: Option<String>,
    #[serde(default)]
    pub shares: Option<String>,
    #[serde(default)]
    pub stop_price: Option<String>,
}

/// Structural validation failure for one trade row.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row}: field '{field}': {reason}")]
pub struct DataError {
    pub row: usize,
    pub field: &'static str,
    pub reason: String,
}

impl DataError {
    fn new(row: usize, field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            row,
            field,
            reason: reason.into(),
        }
    }
}

impl TradeRow {
    /// Validate this row into a `Trade` at position `index`.
    ///
    /// `date_formats` are chrono format strings tried in order; an empty slice
    /// falls back to [`DEFAULT_DATE_FORMATS`].
    pub fn validate(&self, index: usize, date_formats: &[String]) -> Result<Trade, DataError> {
        let date_raw = required(index, "date", &self.date)?;
        let date = parse_date(date_raw, date_formats).ok_or_else(|| {
            DataError::new(index, "date", format!("unparseable date '{date_raw}'"))
        })?;

        let symbol = required(index, "symbol", &self.symbol)?.to_string();

        let side_raw = required(index, "side", &self.side)?;
        let side = Side::parse(side_raw).ok_or_else(|| {
            DataError::new(
                index,
                "side",
                format!("expected LONG or SHORT, got '{side_raw}'"),
            )
        })?;

        let entry_price = positive_number(index, "entry_price", &self.entry_price)?;
        let exit_price = positive_number(index, "exit_price", &self.exit_price)?;
        let shares = positive_number(index, "shares", &self.shares)?;
        let stop_price = optional_number(index, "stop_price", &self.stop_price)?;

        Ok(Trade {
            index,
            date,
            symbol,
            side,
            entry_price,
            exit_price,
            shares,
            stop_price,
        })
    }
}

/// Validate a whole batch, failing on the first structurally invalid row.
pub fn validate_rows(rows: &[TradeRow], date_formats: &[String]) -> Result<Vec<Trade>, DataError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| row.validate(i, date_formats))
        .collect()
}

fn required<'a>(
    row: usize,
    field: &'static str,
    cell: &'a Option<String>,
) -> Result<&'a str, DataError> {
    match cell.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DataError::new(row, field, "missing value")),
    }
}

fn positive_number(
    row: usize,
    field: &'static str,
    cell: &Option<String>,
) -> Result<f64, DataError> {
    let raw = required(row, field, cell)?;
    let value: f64 = raw
        .parse()
        .map_err(|_| DataError::new(row, field, format!("not a number: '{raw}'")))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(DataError::new(
            row,
            field,
            format!("must be a positive number, got {raw}"),
        ));
    }
    Ok(value)
}

/// Stops are optional: null markers map to `None`, numbers (even zero or
/// negative) are kept so the stop rule can judge them, anything else is a
/// structural error.
fn optional_number(
    row: usize,
    field: &'static str,
    cell: &Option<String>,
) -> Result<Option<f64>, DataError> {
    let Some(raw) = cell.as_deref().map(str::trim) else {
        return Ok(None);
    };
    if NULL_MARKERS.iter().any(|m| raw.eq_ignore_ascii_case(m)) {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| DataError::new(row, field, format!("not a number: '{raw}'")))
}

fn parse_date(raw: &str, formats: &[String]) -> Option<NaiveDate> {
    let date = if formats.is_empty() {
        DEFAULT_DATE_FORMATS
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
    } else {
        formats
            .iter()
            .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
    };
    date.or_else(|| {
        DATETIME_FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
            .map(|dt| dt.date())
    })
}
