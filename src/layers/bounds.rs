// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

// Statistical bounds layer: z-scores of compute time and numeric result
// fields against configured (mean, std) pairs.
//
// Penalties stack additively across fields; the final score is clamped to
// [0.0, 1.0]. Several borderline fields can therefore add up to a full
// rejection even if none alone would.

use crate::config::{BoundsRow, BoundsTable, FieldBounds};
use crate::payload::{coerce_f64, ResultPayload, TaskType};
use crate::signal::{LayerId, LayerSignal, Unavailable};

/// Bounds-row key for the claimed compute time.
pub const COMPUTE_TIME_FIELD: &str = "compute_time_ms";

/// z above this: flag and subtract `HARD_PENALTY`.
pub const HARD_Z: f64 = 4.0;
/// z above this (and not above `HARD_Z`): subtract `SOFT_PENALTY`, no flag.
pub const SOFT_Z: f64 = 3.0;
pub const HARD_PENALTY: f64 = 0.3;
pub const SOFT_PENALTY: f64 = 0.1;

/// Minimum std divisor for compute time.
const COMPUTE_TIME_EPSILON: f64 = 1.0;
/// Minimum std divisor for result fields.
const FIELD_EPSILON: f64 = 0.001;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Scores a result against the static bounds table.
pub trait BoundsChecker: Send + Sync {
    fn check(
        &self,
        task_type: TaskType,
        result: &ResultPayload,
        compute_time_ms: u64,
        bounds: &BoundsTable,
    ) -> LayerSignal;
}

// ---------------------------------------------------------------------------
// Default implementation
// ---------------------------------------------------------------------------

pub struct ZScoreBoundsChecker;

impl ZScoreBoundsChecker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ZScoreBoundsChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundsChecker for ZScoreBoundsChecker {
    fn check(
        &self,
        task_type: TaskType,
        result: &ResultPayload,
        compute_time_ms: u64,
        bounds: &BoundsTable,
    ) -> LayerSignal {
        let row = match bounds.get(&task_type) {
            Some(row) if !row.is_empty() => row,
            _ => return LayerSignal::unavailable(LayerId::Statistical, Unavailable::NoBounds),
        };

        let (score, flags) = score_row(row, result, compute_time_ms);
        LayerSignal::scored(LayerId::Statistical, score, flags)
    }
}

/// Unclamped running score and flags for one bounds row.
fn score_row(row: &BoundsRow, result: &ResultPayload, compute_time_ms: u64) -> (f64, Vec<String>) {
    let mut score = 1.0;
    let mut flags = Vec::new();

    if let Some(b) = row.get(COMPUTE_TIME_FIELD) {
        let z = z_score(compute_time_ms as f64, b, COMPUTE_TIME_EPSILON);
        score -= penalty(COMPUTE_TIME_FIELD, z, &mut flags);
    }

    for (field, b) in row {
        if field == COMPUTE_TIME_FIELD {
            continue;
        }
        // Absent or non-numeric values are skipped, not penalized.
        let Some(observed) = result.get(field).and_then(|v| coerce_f64(v).ok()) else {
            continue;
        };
        let z = z_score(observed, b, FIELD_EPSILON);
        score -= penalty(field, z, &mut flags);
    }

    (score, flags)
}

fn z_score(observed: f64, bounds: &FieldBounds, epsilon: f64) -> f64 {
    (observed - bounds.mean).abs() / bounds.std.max(epsilon)
}

/// Penalty for one z-score, pushing a flag for hard violations.
fn penalty(field: &str, z: f64, flags: &mut Vec<String>) -> f64 {
    if z > HARD_Z {
        flags.push(format!("{field} z-score={z:.1} (>4σ)"));
        HARD_PENALTY
    } else if z > SOFT_Z {
        SOFT_PENALTY
    } else {
        0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::LayerOutcome;
    use serde_json::{json, Value};

    fn payload(v: Value) -> ResultPayload {
        v.as_object().cloned().unwrap()
    }

    fn protein_bounds() -> BoundsTable {
        let mut row = BoundsRow::new();
        row.insert(COMPUTE_TIME_FIELD.into(), FieldBounds { mean: 8000.0, std: 5000.0 });
        row.insert("finalEnergy".into(), FieldBounds { mean: -50.0, std: 40.0 });
        row.insert("residueCount".into(), FieldBounds { mean: 100.0, std: 80.0 });
        let mut table = BoundsTable::new();
        table.insert(TaskType::Protein, row);
        table
    }

    fn nominal() -> ResultPayload {
        payload(json!({"finalEnergy": -50, "residueCount": 100, "iterations": 1000}))
    }

    fn check(result: &ResultPayload, compute_time_ms: u64) -> LayerSignal {
        ZScoreBoundsChecker::new().check(TaskType::Protein, result, compute_time_ms, &protein_bounds())
    }

    #[test]
    fn nominal_result_scores_one() {
        let s = check(&nominal(), 8000);
        assert_eq!(s.outcome, LayerOutcome::Scored(1.0));
        assert!(s.flags.is_empty());
    }

    #[test]
    fn far_outlier_flags_and_subtracts_hard_penalty() {
        let mut r = nominal();
        r.insert("finalEnergy".into(), json!(500));
        let s = check(&r, 8000);
        assert!((s.score() - 0.7).abs() < 1e-12);
        assert_eq!(s.flags.len(), 1);
        assert!(s.flags[0].starts_with("finalEnergy z-score=13."));
        assert!(s.flags[0].ends_with("(>4σ)"));
    }

    #[test]
    fn soft_band_penalizes_silently() {
        let mut r = nominal();
        // z = 140 / 40 = 3.5
        r.insert("finalEnergy".into(), json!(90));
        let s = check(&r, 8000);
        assert!((s.score() - 0.9).abs() < 1e-12);
        assert!(s.flags.is_empty());
    }

    #[test]
    fn exactly_at_cut_is_not_penalized() {
        let mut r = nominal();
        // z = 120 / 40 = 3.0, not > 3
        r.insert("finalEnergy".into(), json!(70));
        assert_eq!(check(&r, 8000).score(), 1.0);
    }

    #[test]
    fn compute_time_checked_with_own_flag() {
        // z = (40000 - 8000) / 5000 = 6.4
        let s = check(&nominal(), 40_000);
        assert!((s.score() - 0.7).abs() < 1e-12);
        assert_eq!(s.flags, vec!["compute_time_ms z-score=6.4 (>4σ)"]);
    }

    #[test]
    fn penalties_stack_additively_and_clamp() {
        let r = payload(json!({"finalEnergy": 5000, "residueCount": 100000}));
        let s = check(&r, 1_000_000);
        // three hard violations: 1.0 - 0.9 = 0.1
        assert!((s.score() - 0.1).abs() < 1e-9);
        assert_eq!(s.flags.len(), 3);

        let mut table = protein_bounds();
        table
            .get_mut(&TaskType::Protein)
            .unwrap()
            .insert("iterations".into(), FieldBounds { mean: 0.0, std: 1.0 });
        let r = payload(json!({"finalEnergy": 5000, "residueCount": 100000, "iterations": 1000}));
        let s = ZScoreBoundsChecker::new().check(TaskType::Protein, &r, 1_000_000, &table);
        assert_eq!(s.outcome, LayerOutcome::Scored(0.0));
        assert_eq!(s.flags.len(), 4);
    }

    #[test]
    fn several_soft_violations_add_up() {
        // each z = 3.5 -> three soft penalties
        let r = payload(json!({"finalEnergy": 90, "residueCount": 380}));
        let s = check(&r, 8000 + 17_500);
        assert!((s.score() - 0.7).abs() < 1e-9);
        assert!(s.flags.is_empty());
    }

    #[test]
    fn missing_task_row_is_unavailable() {
        let s = ZScoreBoundsChecker::new().check(TaskType::Climate, &nominal(), 8000, &protein_bounds());
        assert_eq!(s.outcome, LayerOutcome::Unavailable(Unavailable::NoBounds));
        assert_eq!(s.score(), 1.0);
    }

    #[test]
    fn non_numeric_values_are_skipped() {
        let r = payload(json!({"finalEnergy": "lots", "residueCount": null}));
        let s = check(&r, 8000);
        assert_eq!(s.score(), 1.0);
        assert!(s.flags.is_empty());
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let r = payload(json!({"finalEnergy": "500", "residueCount": 100}));
        let s = check(&r, 8000);
        assert!((s.score() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn zero_std_uses_epsilon() {
        let mut table = protein_bounds();
        table
            .get_mut(&TaskType::Protein)
            .unwrap()
            .insert("finalEnergy".into(), FieldBounds { mean: -50.0, std: 0.0 });
        let r = payload(json!({"finalEnergy": -50.001, "residueCount": 100}));
        // z = 0.001 / 0.001 = 1
        let s = ZScoreBoundsChecker::new().check(TaskType::Protein, &r, 8000, &table);
        assert_eq!(s.score(), 1.0);
    }

    #[test]
    fn flags_follow_field_name_order() {
        let r = payload(json!({"residueCount": 100000, "finalEnergy": 5000}));
        let s = check(&r, 8000);
        assert!(s.flags[0].starts_with("finalEnergy"));
        assert!(s.flags[1].starts_with("residueCount"));
    }
}
