//! Trading plan — the declarative rule set a batch is audited against.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;

/// Names of the optional numeric constraints, in declaration order.
pub const NUMERIC_CONSTRAINTS: &[&str] = &["risk_per_trade_pct", "max_position_pct", "max_stop_pct"];

/// Plan is missing a required field, has a wrong-typed field, or holds an
/// invalid value. Fatal for the run; raised before any trade is evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("plan must be an object, got {got}")]
    NotAnObject { got: &'static str },

    #[error("plan missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("plan field '{field}': expected {expected}, got {got}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        got: &'static str,
    },

    #[error("plan field '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// A validated trading plan. Immutable for the duration of a run.
///
/// `allowed_regimes` is a `BTreeSet` so iteration, display and hashing are
/// deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub allowed_regimes: BTreeSet<String>,
    pub stop_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_per_trade_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_position_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stop_pct: Option<f64>,
}

impl Plan {
    pub fn new<I, S>(allowed_regimes: I, stop_required: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_regimes: allowed_regimes.into_iter().map(Into::into).collect(),
            stop_required,
            risk_per_trade_pct: None,
            max_position_pct: None,
            max_stop_pct: None,
        }
    }

    /// Parse and validate a loosely-typed plan document (decoded JSON or TOML).
    ///
    /// Unknown keys are ignored. A numeric constraint set to `null` counts as
    /// absent.
    pub fn from_value(doc: &Value) -> Result<Self, ConfigError> {
        let obj = doc.as_object().ok_or(ConfigError::NotAnObject {
            got: type_name(doc),
        })?;

        let regimes = match obj.get("allowed_regimes") {
            None | Some(Value::Null) => {
                return Err(ConfigError::MissingField {
                    field: "allowed_regimes",
                })
            }
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(ConfigError::WrongType {
                    field: "allowed_regimes",
                    expected: "array of strings",
                    got: type_name(other),
                })
            }
        };
        let mut allowed_regimes = BTreeSet::new();
        for item in regimes {
            match item {
                Value::String(s) => {
                    allowed_regimes.insert(s.clone());
                }
                other => {
                    return Err(ConfigError::WrongType {
                        field: "allowed_regimes",
                        expected: "array of strings",
                        got: type_name(other),
                    })
                }
            }
        }

        let stop_required = match obj.get("stop_required") {
            None | Some(Value::Null) => {
                return Err(ConfigError::MissingField {
                    field: "stop_required",
                })
            }
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(ConfigError::WrongType {
                    field: "stop_required",
                    expected: "boolean",
                    got: type_name(other),
                })
            }
        };

        let plan = Plan {
            allowed_regimes,
            stop_required,
            risk_per_trade_pct: numeric_field(obj, "risk_per_trade_pct")?,
            max_position_pct: numeric_field(obj, "max_position_pct")?,
            max_stop_pct: numeric_field(obj, "max_stop_pct")?,
        };
        plan.validate()?;
        Ok(plan)
    }

    /// Check value-level invariants of a plan built in code.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_regimes.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "allowed_regimes",
                reason: "must not be empty".into(),
            });
        }
        if self.allowed_regimes.iter().any(|r| r.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "allowed_regimes",
                reason: "regime labels must not be blank".into(),
            });
        }
        for (field, value) in self.numeric_constraints() {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be greater than 0, got {value}"),
                });
            }
        }
        Ok(())
    }

    pub fn allows(&self, regime_label: &str) -> bool {
        self.allowed_regimes.contains(regime_label)
    }

    /// Numeric constraints that are set, as `(name, value)` pairs.
    pub fn numeric_constraints(&self) -> Vec<(&'static str, f64)> {
        [
            self.risk_per_trade_pct,
            self.max_position_pct,
            self.max_stop_pct,
        ]
        .into_iter()
        .zip(NUMERIC_CONSTRAINTS.iter().copied())
        .filter_map(|(value, name)| value.map(|v| (name, v)))
        .collect()
    }

    /// The allowed set rendered for violation details, e.g. `[Neutral, Risk-On]`.
    pub fn allowed_regimes_display(&self) -> String {
        let labels: Vec<&str> = self.allowed_regimes.iter().map(String::as_str).collect();
        format!("[{}]", labels.join(", "))
    }
}

fn numeric_field(
    obj: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<Option<f64>, ConfigError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_f64().map(Some).ok_or(ConfigError::InvalidValue {
            field,
            reason: "number out of range".into(),
        }),
        Some(other) => Err(ConfigError::WrongType {
            field,
            expected: "number",
            got: type_name(other),
        }),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_minimal_plan() {
        let plan = Plan::from_value(&json!({
            "allowed_regimes": ["Risk-On"],
            "stop_required": true
        }))
        .unwrap();
        assert!(plan.allows("Risk-On"));
        assert!(!plan.allows("Risk-Off"));
        assert!(plan.stop_required);
        assert!(plan.numeric_constraints().is_empty());
    }

    #[test]
    fn parses_numeric_constraints() {
        let plan = Plan::from_value(&json!({
            "allowed_regimes": ["Risk-On", "Neutral"],
            "stop_required": false,
            "risk_per_trade_pct": 1.0,
            "max_stop_pct": 8,
            "max_position_pct": null
        }))
        .unwrap();
        assert_eq!(
            plan.numeric_constraints(),
            vec![("risk_per_trade_pct", 1.0), ("max_stop_pct", 8.0)]
        );
    }

    #[test]
    fn missing_allowed_regimes() {
        let err = Plan::from_value(&json!({ "stop_required": true })).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingField {
                field: "allowed_regimes"
            }
        );
    }

    #[test]
    fn missing_stop_required() {
        let err = Plan::from_value(&json!({ "allowed_regimes": ["Risk-On"] })).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingField {
                field: "stop_required"
            }
        );
    }

    #[test]
    fn wrong_types_rejected() {
        let err = Plan::from_value(&json!({
            "allowed_regimes": "Risk-On",
            "stop_required": true
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::WrongType { field: "allowed_regimes", got: "string", .. }));

        let err = Plan::from_value(&json!({
            "allowed_regimes": ["Risk-On", 3],
            "stop_required": true
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::WrongType { field: "allowed_regimes", got: "number", .. }));

        let err = Plan::from_value(&json!({
            "allowed_regimes": ["Risk-On"],
            "stop_required": "yes"
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::WrongType { field: "stop_required", .. }));

        let err = Plan::from_value(&json!({
            "allowed_regimes": ["Risk-On"],
            "stop_required": true,
            "max_stop_pct": "8%"
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::WrongType { field: "max_stop_pct", .. }));
    }

    #[test]
    fn empty_regime_set_rejected() {
        let err = Plan::from_value(&json!({
            "allowed_regimes": [],
            "stop_required": true
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "allowed_regimes", .. }));
    }

    #[test]
    fn non_positive_constraint_rejected() {
        let err = Plan::from_value(&json!({
            "allowed_regimes": ["Risk-On"],
            "stop_required": true,
            "risk_per_trade_pct": 0
        }))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "risk_per_trade_pct", .. }));
    }

    #[test]
    fn non_object_rejected() {
        let err = Plan::from_value(&json!(["Risk-On"])).unwrap_err();
        assert_eq!(err, ConfigError::NotAnObject { got: "array" });
    }

    #[test]
    fn typed_plan_validate() {
        assert!(Plan::new(["Risk-On"], true).validate().is_ok());
        assert!(Plan::new(Vec::<String>::new(), true).validate().is_err());
        let mut plan = Plan::new(["Risk-On"], false);
        plan.max_position_pct = Some(-1.0);
        assert!(plan.validate().is_err());
    }

    #[test]
    fn allowed_regimes_display_is_sorted() {
        let plan = Plan::new(["Risk-On", "Neutral"], false);
        assert_eq!(plan.allowed_regimes_display(), "[Neutral, Risk-On]");
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = ConfigError::MissingField {
            field: "allowed_regimes",
        };
        assert_eq!(
            err.to_string(),
            "plan missing required field 'allowed_regimes'"
        );
    }
}
