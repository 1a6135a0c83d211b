// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

// Verification engine.
//
// Wires the layers together for one submitted result:
// - Structural validation (rejects before any scoring)
// - fitness_verify: checklist verifier, scored on its own
// - Every other task type: bounds, outlier model and peer consistency,
//   folded by the score combiner
//
// The engine holds no per-request state. The only shared mutable resource is
// the outlier model inside the model layer.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::layers::bounds::{BoundsChecker, ZScoreBoundsChecker};
use crate::layers::consistency::{ConsistencyChecker, PeerConsistencyChecker};
use crate::layers::fitness::{ChecklistFitnessVerifier, FitnessVerifier};
use crate::layers::model::{ModelLayer, ModelScorer};
use crate::payload::{ResultPayload, TaskType, VerifyRequest};
use crate::signal::combiner::{ScoreCombiner, WeightedCombiner};
use crate::signal::{round4, LayerId, LayerSignal, Recommendation};
use crate::validate::check_structure;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Outcome of verifying one result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    /// Combined confidence in [0.0, 1.0], rounded to 4 decimals.
    pub confidence: f64,
    /// Diagnostic flags, in layer order.
    pub flags: Vec<String>,
    pub recommendation: Recommendation,
    /// Per-layer scores in [0.0, 1.0], rounded to 4 decimals.
    pub layer_scores: BTreeMap<LayerId, f64>,
}

/// A request the engine refuses to score.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    /// Field-level problems found by the structural validator, in order.
    #[error("invalid result structure: {}", .0.join("; "))]
    Structural(Vec<String>),
}

impl RequestError {
    pub fn errors(&self) -> &[String] {
        match self {
            RequestError::Structural(errors) => errors,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine dependencies
// ---------------------------------------------------------------------------

pub struct EngineDeps {
    pub config: Arc<Config>,
    pub bounds: Arc<dyn BoundsChecker>,
    pub model: Arc<dyn ModelScorer>,
    pub consistency: Arc<dyn ConsistencyChecker>,
    pub fitness: Arc<dyn FitnessVerifier>,
    pub combiner: Arc<dyn ScoreCombiner>,
}

// ---------------------------------------------------------------------------
// VerificationEngine
// ---------------------------------------------------------------------------

pub struct VerificationEngine {
    deps: EngineDeps,
}

impl VerificationEngine {
    pub fn new_with(deps: EngineDeps) -> Self {
        Self { deps }
    }

    pub fn config(&self) -> &Config {
        &self.deps.config
    }

    /// Validate and score one request.
    ///
    /// Structurally invalid input is rejected with the validator's messages
    /// and never reaches a scoring layer.
    pub fn verify(&self, request: &VerifyRequest) -> Result<VerificationResult, RequestError> {
        let request_id = Uuid::new_v4().to_string();
        let start = Instant::now();

        let task_type = match check_structure(&request.task_type, &request.result) {
            Ok(task_type) => task_type,
            Err(errors) => {
                tracing::info!(
                    request_id = %request_id,
                    task_type = %request.task_type,
                    error_count = errors.len(),
                    "structural rejection"
                );
                return Err(RequestError::Structural(
                    errors.iter().map(ToString::to_string).collect(),
                ));
            }
        };

        let peers = request.peer_results.as_deref().unwrap_or_default();
        let result = self.verify_checked(task_type, &request.result, request.compute_time_ms, peers);

        tracing::info!(
            request_id = %request_id,
            contract_hash = %self.deps.config.contract_hash,
            task_type = %task_type,
            compute_time_ms = request.compute_time_ms,
            peer_count = peers.len(),
            layer_scores = ?result.layer_scores,
            confidence = result.confidence,
            recommendation = result.recommendation.as_str(),
            flag_count = result.flags.len(),
            latency_ms = start.elapsed().as_secs_f64() * 1000.0,
            "verified"
        );

        Ok(result)
    }

    /// Score a result that already passed structural validation.
    pub fn verify_checked(
        &self,
        task_type: TaskType,
        result: &ResultPayload,
        compute_time_ms: u64,
        peers: &[ResultPayload],
    ) -> VerificationResult {
        if task_type == TaskType::FitnessVerify {
            return self.verify_fitness(result);
        }

        let statistical = self.deps.bounds.check(
            task_type,
            result,
            compute_time_ms,
            &self.deps.config.policy.bounds,
        );
        let ml = self.deps.model.check(task_type, result, compute_time_ms);
        let consistency = self.deps.consistency.check(result, peers);

        let verdict = self
            .deps
            .combiner
            .combine(&statistical.outcome, &ml.outcome, &consistency.outcome);

        assemble(verdict.confidence, verdict.recommendation, [statistical, ml, consistency])
    }

    /// Score a fitness_verify result with the checklist verifier alone.
    pub fn verify_fitness(&self, result: &ResultPayload) -> VerificationResult {
        let signal = self.deps.fitness.verify(result);
        let confidence = round4(signal.score());
        let recommendation = self.deps.combiner.recommend(confidence);
        assemble(confidence, recommendation, [signal])
    }

    /// Re-read the model artifact. Returns whether a model is now loaded.
    pub fn reload_model(&self) -> bool {
        let loaded = self.deps.model.reload();
        tracing::info!(model_loaded = loaded, "model reload");
        loaded
    }

    /// Whether a model is currently loaded. Never triggers a load.
    pub fn model_loaded(&self) -> bool {
        self.deps.model.is_loaded()
    }
}

fn assemble<const N: usize>(
    confidence: f64,
    recommendation: Recommendation,
    signals: [LayerSignal; N],
) -> VerificationResult {
    let mut flags = Vec::new();
    let mut layer_scores = BTreeMap::new();
    for signal in signals {
        layer_scores.insert(signal.layer, round4(signal.score()));
        flags.extend(signal.flags);
    }

    VerificationResult {
        confidence,
        flags,
        recommendation,
        layer_scores,
    }
}

// ---------------------------------------------------------------------------
// Public factory for the default engine
// ---------------------------------------------------------------------------

pub fn build_engine(config: Arc<Config>) -> VerificationEngine {
    let deps = EngineDeps {
        bounds: Arc::new(ZScoreBoundsChecker::new()),
        model: Arc::new(ModelLayer::from_config(&config.runtime.model)),
        consistency: Arc::new(PeerConsistencyChecker::new()),
        fitness: Arc::new(ChecklistFitnessVerifier::new()),
        combiner: Arc::new(WeightedCombiner::new(config.policy.thresholds)),
        config,
    };

    VerificationEngine::new_with(deps)
}
