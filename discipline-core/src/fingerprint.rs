//! Input fingerprinting — deterministic identification of an audit's inputs.
//!
//! The hash covers the validated trades, the plan and the regime label, using
//! a canonical JSON serialization (struct field order + `BTreeSet` regimes), so
//! the same batch always produces the same `InputHash`.

use serde::Serialize;

use crate::domain::{InputHash, Plan, Trade};

#[derive(Serialize)]
struct CanonicalInputs<'a> {
    regime_label: &'a str,
    plan: &'a Plan,
    trades: &'a [Trade],
}

/// Hash the inputs of one audit run.
pub fn input_hash(trades: &[Trade], plan: &Plan, regime_label: &str) -> InputHash {
    let canonical = CanonicalInputs {
        regime_label,
        plan,
        trades,
    };
    // Trades and plans hold only strings, numbers, dates and sets; serde_json
    // rejects none of them (non-finite floats serialize as null).
    let json = serde_json::to_vec(&canonical).unwrap_or_default();
    InputHash::from_bytes(&json)
}
