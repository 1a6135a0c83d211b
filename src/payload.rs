// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

// Request payload types shared by every layer.
//
// Submitted results are loosely typed JSON objects whose shape depends on the
// task type. Layers read them through the helpers here so that numeric
// coercion behaves the same everywhere.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A submitted result: field name -> dynamically typed value.
///
/// Backed by an insertion-ordered map, so iteration follows the order the
/// fields appeared in the submitted JSON.
pub type ResultPayload = serde_json::Map<String, Value>;

/// The category of compute workload being verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Protein,
    Climate,
    Signal,
    Drugscreen,
    FitnessVerify,
}

impl TaskType {
    pub const ALL: [TaskType; 5] = [
        TaskType::Protein,
        TaskType::Climate,
        TaskType::Signal,
        TaskType::Drugscreen,
        TaskType::FitnessVerify,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Protein => "protein",
            TaskType::Climate => "climate",
            TaskType::Signal => "signal",
            TaskType::Drugscreen => "drugscreen",
            TaskType::FitnessVerify => "fitness_verify",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known task type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task type: {0}")]
pub struct UnknownTaskType(pub String);

impl FromStr for TaskType {
    type Err = UnknownTaskType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTaskType(s.to_string()))
    }
}

/// Input to the verify operation.
///
/// `task_type` stays a string here: an unknown task type is a structural
/// rejection reported by the validator, not a deserialization failure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerifyRequest {
    pub task_type: String,
    pub result: ResultPayload,
    pub compute_time_ms: u64,
    #[serde(default)]
    pub peer_results: Option<Vec<ResultPayload>>,
}

// ---------------------------------------------------------------------------
// Value helpers
// ---------------------------------------------------------------------------

/// Why a JSON value could not be read as a float.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoercionError {
    #[error("null is not numeric")]
    Null,
    #[error("string \"{0}\" is not numeric")]
    NonNumericString(String),
    #[error("{0} is not numeric")]
    Unsupported(&'static str),
}

/// Coerce a JSON value to `f64` with lenient numeric semantics.
///
/// Numbers pass through, booleans map to 1.0 / 0.0 and numeric strings are
/// parsed. Null, mappings, arrays and non-numeric strings fail.
pub fn coerce_f64(value: &Value) -> Result<f64, CoercionError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or(CoercionError::Unsupported("number")),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CoercionError::NonNumericString(s.clone())),
        Value::Null => Err(CoercionError::Null),
        Value::Array(_) => Err(CoercionError::Unsupported("array")),
        Value::Object(_) => Err(CoercionError::Unsupported("mapping")),
    }
}

/// The JSON number in `value`, if it is a number. Booleans are excluded.
pub fn strict_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Top-level numeric (non-boolean) values of a payload, in field order.
///
/// Nested mappings are not descended into.
pub fn flatten_numeric(payload: &ResultPayload) -> Vec<f64> {
    payload.values().filter_map(strict_number).collect()
}

/// Truthiness of a JSON value: false, 0, "", null and empty collections are
/// falsy; everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Human-readable JSON kind name, used in validation messages.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(v: Value) -> ResultPayload {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn task_type_round_trips_through_str() {
        for t in TaskType::ALL {
            assert_eq!(t.as_str().parse::<TaskType>().unwrap(), t);
        }
    }

    #[test]
    fn unknown_task_type_names_the_input() {
        let err = "weather".parse::<TaskType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown task type: weather");
    }

    #[test]
    fn task_type_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TaskType::FitnessVerify).unwrap(),
            "\"fitness_verify\""
        );
    }

    #[test]
    fn coerce_accepts_numbers_bools_and_numeric_strings() {
        assert_eq!(coerce_f64(&json!(-50)).unwrap(), -50.0);
        assert_eq!(coerce_f64(&json!(2.5)).unwrap(), 2.5);
        assert_eq!(coerce_f64(&json!(true)).unwrap(), 1.0);
        assert_eq!(coerce_f64(&json!(" 12.5 ")).unwrap(), 12.5);
    }

    #[test]
    fn coerce_rejects_null_objects_and_text() {
        assert_eq!(coerce_f64(&Value::Null), Err(CoercionError::Null));
        assert!(coerce_f64(&json!({"a": 1})).is_err());
        assert!(coerce_f64(&json!([1])).is_err());
        assert!(coerce_f64(&json!("abc")).is_err());
    }

    #[test]
    fn flatten_keeps_field_order_and_skips_booleans() {
        let p = payload(json!({
            "b": 2,
            "flag": true,
            "a": 1.5,
            "name": "x",
            "nested": {"c": 3}
        }));
        assert_eq!(flatten_numeric(&p), vec![2.0, 1.5]);
    }

    #[test]
    fn truthiness_matches_expectations() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(3)));
        assert!(is_truthy(&json!("yes")));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!({})));
    }

    #[test]
    fn kind_name_distinguishes_integers() {
        assert_eq!(kind_name(&json!(3)), "integer");
        assert_eq!(kind_name(&json!(3.5)), "number");
        assert_eq!(kind_name(&json!(true)), "boolean");
        assert_eq!(kind_name(&json!({})), "mapping");
    }

    #[test]
    fn verify_request_peer_results_default_to_none() {
        let req: VerifyRequest = serde_json::from_value(json!({
            "task_type": "protein",
            "result": {"finalEnergy": -50},
            "compute_time_ms": 8000
        }))
        .unwrap();
        assert!(req.peer_results.is_none());
        assert_eq!(req.compute_time_ms, 8000);
    }

    #[test]
    fn verify_request_rejects_negative_compute_time() {
        let res: Result<VerifyRequest, _> = serde_json::from_value(json!({
            "task_type": "protein",
            "result": {},
            "compute_time_ms": -1
        }));
        assert!(res.is_err());
    }
}
