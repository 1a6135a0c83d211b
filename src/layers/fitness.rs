// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

// Fitness-result verifier.
//
// fitness_verify results bypass the weighted pipeline. The submitting node
// reports a checklist of named sub-verifications and its own confidence; this
// layer judges whether that checklist looks like honest work.

use serde_json::Value;

use crate::payload::{is_truthy, strict_number, ResultPayload};
use crate::signal::{LayerId, LayerSignal};

/// Sub-checks an honest node is expected to run.
pub const EXPECTED_CHECKS: [&str; 5] = [
    "hrPlausible",
    "paceReasonable",
    "caloriesReasonable",
    "noTimeOverlap",
    "withinBaseline",
];

/// Fewer expected checks than this present: penalize.
pub const MIN_EXPECTED_CHECKS: usize = 3;
pub const TOO_FEW_CHECKS_PENALTY: f64 = 0.3;
pub const OVERCONFIDENCE_PENALTY: f64 = 0.4;

pub const NO_CHECKS_FLAG: &str = "no verification checks provided";
pub const OVERCONFIDENCE_FLAG: &str = "perfect confidence despite failed checks";

pub trait FitnessVerifier: Send + Sync {
    fn verify(&self, result: &ResultPayload) -> LayerSignal;
}

#[derive(Default)]
pub struct ChecklistFitnessVerifier;

impl ChecklistFitnessVerifier {
    pub fn new() -> Self {
        Self
    }
}

impl FitnessVerifier for ChecklistFitnessVerifier {
    fn verify(&self, result: &ResultPayload) -> LayerSignal {
        let checks = match result.get("checks") {
            Some(Value::Object(checks)) if !checks.is_empty() => checks,
            _ => {
                return LayerSignal::scored(LayerId::FitnessVerify, 0.0, vec![NO_CHECKS_FLAG.to_string()]);
            }
        };

        let mut score = 1.0;
        let mut flags = Vec::new();

        let performed = EXPECTED_CHECKS.iter().filter(|name| checks.contains_key(**name)).count();
        if performed < MIN_EXPECTED_CHECKS {
            flags.push(format!(
                "only {performed}/{} expected checks performed",
                EXPECTED_CHECKS.len()
            ));
            score -= TOO_FEW_CHECKS_PENALTY;
        }

        // Every reported check counts here, expected or not.
        let all_passed = checks.values().all(is_truthy);
        let reported = result.get("confidence").and_then(strict_number);
        if reported == Some(1.0) && !all_passed {
            flags.push(OVERCONFIDENCE_FLAG.to_string());
            score -= OVERCONFIDENCE_PENALTY;
        }

        LayerSignal::scored(LayerId::FitnessVerify, score, flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::LayerOutcome;
    use serde_json::json;

    fn verify(v: Value) -> LayerSignal {
        ChecklistFitnessVerifier::new().verify(v.as_object().unwrap())
    }

    #[test]
    fn empty_checks_scores_zero() {
        let s = verify(json!({"checks": {}, "confidence": 0.9}));
        assert_eq!(s.outcome, LayerOutcome::Scored(0.0));
        assert_eq!(s.flags, vec![NO_CHECKS_FLAG]);
    }

    #[test]
    fn missing_or_non_mapping_checks_scores_zero() {
        assert_eq!(verify(json!({"confidence": 0.9})).score(), 0.0);
        assert_eq!(verify(json!({"checks": ["hrPlausible"]})).score(), 0.0);
    }

    #[test]
    fn honest_full_checklist_scores_one() {
        let s = verify(json!({
            "checks": {
                "hrPlausible": true, "paceReasonable": true, "caloriesReasonable": true,
                "noTimeOverlap": true, "withinBaseline": true
            },
            "confidence": 1.0
        }));
        assert_eq!(s.score(), 1.0);
        assert!(s.flags.is_empty());
    }

    #[test]
    fn perfect_confidence_with_failed_check_penalized() {
        let s = verify(json!({
            "checks": {
                "hrPlausible": true, "paceReasonable": false,
                "caloriesReasonable": true, "noTimeOverlap": true
            },
            "confidence": 1.0
        }));
        assert!((s.score() - 0.6).abs() < 1e-12);
        assert_eq!(s.flags, vec![OVERCONFIDENCE_FLAG]);
    }

    #[test]
    fn too_few_expected_checks_penalized() {
        let s = verify(json!({
            "checks": {"hrPlausible": true, "customCheck": true},
            "confidence": 0.8
        }));
        assert!((s.score() - 0.7).abs() < 1e-12);
        assert_eq!(s.flags, vec!["only 1/5 expected checks performed"]);
    }

    #[test]
    fn both_penalties_stack() {
        let s = verify(json!({
            "checks": {"hrPlausible": false},
            "confidence": 1
        }));
        assert!((s.score() - 0.3).abs() < 1e-9);
        assert_eq!(s.flags.len(), 2);
    }

    #[test]
    fn failed_unexpected_check_still_counts_as_failure() {
        let s = verify(json!({
            "checks": {
                "hrPlausible": true, "paceReasonable": true, "caloriesReasonable": true,
                "gpsSane": false
            },
            "confidence": 1.0
        }));
        assert_eq!(s.flags, vec![OVERCONFIDENCE_FLAG]);
    }

    #[test]
    fn non_numeric_confidence_is_not_perfect() {
        let s = verify(json!({
            "checks": {"hrPlausible": false, "paceReasonable": true, "caloriesReasonable": true},
            "confidence": true
        }));
        assert_eq!(s.score(), 1.0);
    }

    #[test]
    fn falsy_values_count_as_failed() {
        let s = verify(json!({
            "checks": {"hrPlausible": 0, "paceReasonable": "", "caloriesReasonable": true},
            "confidence": 1.0
        }));
        assert!(s.flags.contains(&OVERCONFIDENCE_FLAG.to_string()));
    }
}
