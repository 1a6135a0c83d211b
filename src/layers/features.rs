// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

// Fixed-order feature vectors for the outlier model.
//
// The order here must match the order the training pipeline used when it
// fitted the model. The first element is always the claimed compute time.

use serde_json::Value;

use crate::payload::{coerce_f64, is_truthy, CoercionError, ResultPayload, TaskType};

/// Result fields that follow `compute_time_ms` in the feature vector, for the
/// task types whose features are plain numeric fields.
pub fn numeric_feature_fields(task_type: TaskType) -> Option<&'static [&'static str]> {
    match task_type {
        TaskType::Protein => Some(&["finalEnergy", "residueCount", "iterations"]),
        TaskType::Climate => Some(&["maxTemperature", "avgTemperature", "centerTemp"]),
        TaskType::Signal => Some(&["maxMagnitude", "fftSize", "numSamples"]),
        TaskType::Drugscreen => Some(&["bindingAffinity", "interactionCount", "orientationsScanned"]),
        TaskType::FitnessVerify => None,
    }
}

/// Length of every feature vector produced by `extract_features`.
pub const FEATURE_COUNT: usize = 4;

/// Build the model's feature vector for a result.
///
/// Absent fields default to 0. Present fields that cannot be coerced to a
/// number are an error.
pub fn extract_features(
    task_type: TaskType,
    result: &ResultPayload,
    compute_time_ms: u64,
) -> Result<Vec<f64>, CoercionError> {
    let mut features = Vec::with_capacity(FEATURE_COUNT);
    features.push(compute_time_ms as f64);

    match numeric_feature_fields(task_type) {
        Some(fields) => {
            for field in fields {
                features.push(field_or_zero(result, field)?);
            }
        }
        None => {
            // fitness_verify: self-reported confidence, verified flag, check count
            features.push(field_or_zero(result, "confidence")?);
            features.push(if result.get("verified").is_some_and(is_truthy) { 1.0 } else { 0.0 });
            let check_count = match result.get("checks") {
                Some(Value::Object(m)) => m.len(),
                Some(Value::Array(a)) => a.len(),
                _ => 0,
            };
            features.push(check_count as f64);
        }
    }

    Ok(features)
}

fn field_or_zero(result: &ResultPayload, field: &str) -> Result<f64, CoercionError> {
    match result.get(field) {
        Some(v) => coerce_f64(v),
        None => Ok(0.0),
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
    fn protein_features_follow_fixed_order() {
        let r = payload(json!({"iterations": 1000, "residueCount": 100, "finalEnergy": -50}));
        assert_eq!(
            extract_features(TaskType::Protein, &r, 8000).unwrap(),
            vec![8000.0, -50.0, 100.0, 1000.0]
        );
    }

    #[test]
    fn absent_fields_default_to_zero() {
        let r = payload(json!({"maxTemperature": 31.5}));
        assert_eq!(
            extract_features(TaskType::Climate, &r, 6000).unwrap(),
            vec![6000.0, 31.5, 0.0, 0.0]
        );
    }

    #[test]
    fn uncoercible_field_is_an_error() {
        let r = payload(json!({"maxMagnitude": "loud", "fftSize": 8192, "numSamples": 10}));
        assert!(extract_features(TaskType::Signal, &r, 3000).is_err());

        let r = payload(json!({"bindingAffinity": null}));
        assert!(extract_features(TaskType::Drugscreen, &r, 10).is_err());
    }

    #[test]
    fn fitness_features_use_confidence_verified_and_check_count() {
        let r = payload(json!({
            "checks": {"hrPlausible": true, "paceReasonable": false},
            "confidence": 0.9,
            "verified": true
        }));
        assert_eq!(
            extract_features(TaskType::FitnessVerify, &r, 120).unwrap(),
            vec![120.0, 0.9, 1.0, 2.0]
        );
    }

    #[test]
    fn every_task_type_yields_same_length() {
        let empty = ResultPayload::new();
        for t in TaskType::ALL {
            assert_eq!(extract_features(t, &empty, 1).unwrap().len(), FEATURE_COUNT);
        }
    }
}
