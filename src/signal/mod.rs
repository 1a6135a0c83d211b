// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

// Signal types for the score combiner.
//
// Each layer reports a LayerSignal: either a score in [0.0, 1.0] or an
// explicit "unavailable" outcome, plus the diagnostic flags it raised. The
// combiner folds the three pipeline signals into a confidence and a
// recommendation.

pub mod combiner;

use serde::Serialize;

/// Score contributed by a layer whose signal is unavailable.
pub const NEUTRAL_SCORE: f64 = 1.0;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// Identifies which layer produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerId {
    Statistical,
    Ml,
    Consistency,
    FitnessVerify,
}

impl LayerId {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerId::Statistical => "statistical",
            LayerId::Ml => "ml",
            LayerId::Consistency => "consistency",
            LayerId::FitnessVerify => "fitness_verify",
        }
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a layer could not produce a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    /// No bounds row configured for the task type.
    NoBounds,
    /// No trained model is loaded.
    NoModel,
    /// The model rejected or failed on the feature vector.
    ModelFailure,
    /// No peer results, or none comparable with the candidate.
    NoPeers,
    /// The candidate has no numeric fields to compare.
    NoNumericFields,
}

/// Outcome of a single layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerOutcome {
    /// The layer scored the result. Always within [0.0, 1.0].
    Scored(f64),
    /// The layer's signal is missing. Counts as a neutral pass.
    Unavailable(Unavailable),
}

impl LayerOutcome {
    /// Construct a scored outcome, clamping into [0.0, 1.0].
    pub fn scored(score: f64) -> Self {
        LayerOutcome::Scored(clamp_unit(score))
    }

    /// The score this outcome contributes. Unavailable counts as
    /// `NEUTRAL_SCORE`.
    pub fn score(&self) -> f64 {
        match self {
            LayerOutcome::Scored(s) => *s,
            LayerOutcome::Unavailable(_) => NEUTRAL_SCORE,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, LayerOutcome::Scored(_))
    }
}

/// A layer's outcome together with the flags it raised.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSignal {
    pub layer: LayerId,
    pub outcome: LayerOutcome,
    pub flags: Vec<String>,
}

impl LayerSignal {
    pub fn scored(layer: LayerId, score: f64, flags: Vec<String>) -> Self {
        Self {
            layer,
            outcome: LayerOutcome::scored(score),
            flags,
        }
    }

    pub fn unavailable(layer: LayerId, reason: Unavailable) -> Self {
        Self {
            layer,
            outcome: LayerOutcome::Unavailable(reason),
            flags: Vec::new(),
        }
    }

    pub fn score(&self) -> f64 {
        self.outcome.score()
    }
}

/// Clamp a f64 to [0.0, 1.0]. NaN and -INFINITY clamp to 0.0.
pub fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Round to 4 decimal digits for reporting. Exact ties go away from zero.
pub fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

/// Downstream action recommended for a verified result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Accept,
    Review,
    Reject,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Accept => "accept",
            Recommendation::Review => "review",
            Recommendation::Reject => "reject",
        }
    }
}

/// Two fixed cut points mapping confidence to a recommendation.
///
/// Invariant (enforced by config validation): `0 <= review <= accept <= 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub accept: f64,
    pub review: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            accept: 0.8,
            review: 0.5,
        }
    }
}

impl Thresholds {
    /// Values exactly at a cut point go to the higher tier.
    pub fn recommend(&self, confidence: f64) -> Recommendation {
        if confidence >= self.accept {
            Recommendation::Accept
        } else if confidence >= self.review {
            Recommendation::Review
        } else {
            Recommendation::Reject
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scored_clamps_nan_to_zero() {
        assert_eq!(LayerOutcome::scored(f64::NAN).score(), 0.0);
    }

    #[test]
    fn scored_clamps_infinities() {
        assert_eq!(LayerOutcome::scored(f64::NEG_INFINITY).score(), 0.0);
        assert_eq!(LayerOutcome::scored(f64::INFINITY).score(), 1.0);
    }

    #[test]
    fn scored_clamps_out_of_range() {
        assert_eq!(LayerOutcome::scored(-0.2).score(), 0.0);
        assert_eq!(LayerOutcome::scored(1.7).score(), 1.0);
    }

    #[test]
    fn unavailable_is_exactly_neutral() {
        for reason in [Unavailable::NoModel, Unavailable::NoPeers, Unavailable::NoBounds] {
            assert_eq!(LayerOutcome::Unavailable(reason).score(), 1.0);
        }
    }

    #[test]
    fn unavailable_signal_has_no_flags() {
        let s = LayerSignal::unavailable(LayerId::Ml, Unavailable::NoModel);
        assert!(s.flags.is_empty());
        assert!(!s.outcome.is_available());
    }

    #[test]
    fn cut_points_round_up() {
        let t = Thresholds::default();
        assert_eq!(t.recommend(0.8), Recommendation::Accept);
        assert_eq!(t.recommend(0.7999), Recommendation::Review);
        assert_eq!(t.recommend(0.5), Recommendation::Review);
        assert_eq!(t.recommend(0.4999), Recommendation::Reject);
        assert_eq!(t.recommend(0.0), Recommendation::Reject);
    }

    #[test]
    fn round4_truncates_noise() {
        assert_eq!(round4(0.91000000000001), 0.91);
        assert_eq!(round4(0.123456), 0.1235);
    }

    #[test]
    fn round4_breaks_exact_ties_away_from_zero() {
        // 0.03125 is exact in binary, so this is a true tie
        assert_eq!(round4(0.03125), 0.0313);
        assert_eq!(round4(-0.03125), -0.0313);
    }

    #[test]
    fn layer_ids_serialize_snake_case() {
        assert_eq!(serde_json::to_string(&LayerId::FitnessVerify).unwrap(), "\"fitness_verify\"");
        assert_eq!(serde_json::to_string(&Recommendation::Review).unwrap(), "\"review\"");
    }
}
