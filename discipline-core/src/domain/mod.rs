//! Domain types for the discipline auditor

pub mod ids;
pub mod plan;
pub mod report;
pub mod trade;
pub mod violation;

pub use ids::InputHash;
pub use plan::{ConfigError, Plan, NUMERIC_CONSTRAINTS};
pub use report::{Report, SCHEMA_VERSION};
pub use trade::{validate_rows, DataError, Side, Trade, TradeRow, DEFAULT_DATE_FORMATS};
pub use violation::{Violation, ViolationType};
