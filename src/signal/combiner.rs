// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

// Score combiner: fixed-weight aggregation of the three pipeline layers.

use super::{clamp_unit, round4, LayerOutcome, Recommendation, Thresholds};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Folds the per-layer outcomes into one confidence and a recommendation.
pub trait ScoreCombiner: Send + Sync {
    fn combine(
        &self,
        statistical: &LayerOutcome,
        ml: &LayerOutcome,
        consistency: &LayerOutcome,
    ) -> Verdict;

    /// Map an already-computed confidence onto a recommendation.
    fn recommend(&self, confidence: f64) -> Recommendation;
}

/// Combined confidence (rounded to 4 decimals) and its recommendation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub confidence: f64,
    pub recommendation: Recommendation,
}

// ---------------------------------------------------------------------------
// Default implementation
// ---------------------------------------------------------------------------

pub const STATISTICAL_WEIGHT: f64 = 0.30;
pub const ML_WEIGHT: f64 = 0.40;
pub const CONSISTENCY_WEIGHT: f64 = 0.30;

/// Weighted average with weights 0.30 / 0.40 / 0.30.
///
/// Unavailable layers contribute exactly 1.0.
pub struct WeightedCombiner {
    thresholds: Thresholds,
}

impl WeightedCombiner {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }
}

impl Default for WeightedCombiner {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

impl ScoreCombiner for WeightedCombiner {
    fn combine(
        &self,
        statistical: &LayerOutcome,
        ml: &LayerOutcome,
        consistency: &LayerOutcome,
    ) -> Verdict {
        let raw = STATISTICAL_WEIGHT * statistical.score()
            + ML_WEIGHT * ml.score()
            + CONSISTENCY_WEIGHT * consistency.score();
        let confidence = round4(clamp_unit(raw));
        Verdict {
            confidence,
            recommendation: self.recommend(confidence),
        }
    }

    fn recommend(&self, confidence: f64) -> Recommendation {
        self.thresholds.recommend(confidence)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
