// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

// Outlier model adapter.
//
// Holds an optional trained model behind a swappable slot, builds the
// fixed-order feature vector for a result, and maps the model's
// classification and continuous score into a layer score. A missing or
// broken model never fails verification: it yields an unavailable signal,
// which the combiner treats as a neutral pass.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use sha2::{Digest, Sha256};

use super::features::{extract_features, FEATURE_COUNT};
use super::forest::IsolationForest;
use crate::config::ModelConfig;
use crate::model_path::resolve_model_path;
use crate::payload::{ResultPayload, TaskType};
use crate::signal::{LayerId, LayerSignal, Unavailable};

/// Outlier scores are mapped into [0.0, OUTLIER_CEILING].
pub const OUTLIER_CEILING: f64 = 0.5;
/// Inlier scores are mapped into [INLIER_FLOOR, 1.0].
pub const INLIER_FLOOR: f64 = 0.7;
/// Slope applied to the continuous score for inliers.
pub const INLIER_SLOPE: f64 = 0.3;

// ---------------------------------------------------------------------------
// Model trait + errors
// ---------------------------------------------------------------------------

/// Inlier/outlier decision of a trained model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Inlier,
    Outlier,
}

/// Error raised by a model while scoring one feature vector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
    #[error("feature {index} is not finite")]
    NonFinite { index: usize },
    #[error("inference error: {0}")]
    Inference(String),
}

/// A trained anomaly model. Higher scores mean more normal.
pub trait OutlierModel: Send + Sync {
    fn classify(&self, features: &[f64]) -> Result<Classification, ModelError>;

    fn score(&self, features: &[f64]) -> Result<f64, ModelError>;
}

/// Error returned while loading a model artifact.
#[derive(Debug, thiserror::Error)]
pub enum ModelInitError {
    #[error("no model path configured and no home directory found")]
    NoPath,
    #[error("model artifact not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    #[error("invalid model artifact: {0}")]
    Artifact(String),
}

impl ModelInitError {
    /// True when the artifact simply does not exist yet.
    pub fn is_absent(&self) -> bool {
        matches!(self, ModelInitError::NoPath | ModelInitError::NotFound(_))
    }
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

/// Produces a fresh model instance on each call.
pub trait ModelLoader: Send + Sync {
    fn load(&self) -> Result<Arc<dyn OutlierModel>, ModelInitError>;
}

/// Loads an isolation-forest artifact from disk, optionally verifying its
/// SHA-256 digest first.
pub struct FileModelLoader {
    path: Option<PathBuf>,
    sha256: Option<String>,
}

impl FileModelLoader {
    pub fn new(path: Option<PathBuf>, sha256: Option<String>) -> Self {
        Self { path, sha256 }
    }

    /// Resolve the artifact location from config, env, then home default.
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(
            resolve_model_path(config.path.as_deref()),
            config.sha256.clone(),
        )
    }

    pub fn path(&self) -> Option<&std::path::Path> {
        self.path.as_deref()
    }
}

impl ModelLoader for FileModelLoader {
    fn load(&self) -> Result<Arc<dyn OutlierModel>, ModelInitError> {
        let path = self.path.as_ref().ok_or(ModelInitError::NoPath)?;
        let data = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ModelInitError::NotFound(path.clone())
            } else {
                ModelInitError::Read {
                    path: path.clone(),
                    source: e,
                }
            }
        })?;

        match &self.sha256 {
            Some(expected) => {
                let actual = format!("{:x}", Sha256::digest(&data));
                if &actual != expected {
                    return Err(ModelInitError::ChecksumMismatch {
                        expected: expected.clone(),
                        actual,
                    });
                }
            }
            None => {
                tracing::debug!(path = %path.display(), "no model checksum configured, skipping verification");
            }
        }

        let forest = IsolationForest::from_json(&data).map_err(ModelInitError::Artifact)?;
        if forest.n_features != FEATURE_COUNT {
            return Err(ModelInitError::Artifact(format!(
                "artifact expects {} features, extractor produces {FEATURE_COUNT}",
                forest.n_features
            )));
        }
        Ok(Arc::new(forest))
    }
}

/// Hands out a model that already exists in memory. Mainly for tests and
/// embedding.
pub struct FixedModelLoader {
    model: Option<Arc<dyn OutlierModel>>,
}

impl FixedModelLoader {
    pub fn new(model: Arc<dyn OutlierModel>) -> Self {
        Self { model: Some(model) }
    }

    /// A loader that never finds a model.
    pub fn empty() -> Self {
        Self { model: None }
    }
}

impl ModelLoader for FixedModelLoader {
    fn load(&self) -> Result<Arc<dyn OutlierModel>, ModelInitError> {
        self.model.clone().ok_or(ModelInitError::NoPath)
    }
}

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

enum SlotState {
    /// Nothing attempted yet.
    Pending,
    /// Load attempted; `None` means no model.
    Ready(Option<Arc<dyn OutlierModel>>),
}

/// The single shared mutable resource of the engine.
///
/// Readers clone the `Arc` under a short read lock and score without
/// holding it. Reload builds the new model outside the lock and swaps it
/// in, so a reader sees either the old model, the new one, or none, but
/// never a partially loaded one.
pub struct ModelSlot {
    loader: Box<dyn ModelLoader>,
    state: RwLock<SlotState>,
}

impl ModelSlot {
    pub fn new(loader: Box<dyn ModelLoader>) -> Self {
        Self {
            loader,
            state: RwLock::new(SlotState::Pending),
        }
    }

    /// The current model, loading it on first use.
    pub fn current(&self) -> Option<Arc<dyn OutlierModel>> {
        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if let SlotState::Ready(model) = &*state {
                return model.clone();
            }
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let SlotState::Ready(model) = &*state {
            return model.clone();
        }
        let model = self.load();
        *state = SlotState::Ready(model.clone());
        model
    }

    /// Re-read the artifact and swap it in. Returns whether a model is now
    /// loaded.
    pub fn reload(&self) -> bool {
        let model = self.load();
        let loaded = model.is_some();
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = SlotState::Ready(model);
        loaded
    }

    /// Whether a model is loaded, without triggering a load.
    pub fn is_loaded(&self) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        matches!(&*state, SlotState::Ready(Some(_)))
    }

    fn load(&self) -> Option<Arc<dyn OutlierModel>> {
        match self.loader.load() {
            Ok(model) => {
                tracing::info!("outlier model loaded");
                Some(model)
            }
            Err(e) if e.is_absent() => {
                tracing::info!(reason = %e, "no outlier model available, ml signal disabled");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "outlier model failed to load, ml signal disabled");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Layer trait
// ---------------------------------------------------------------------------

/// Scores a result with the trained model, if any.
pub trait ModelScorer: Send + Sync {
    fn check(&self, task_type: TaskType, result: &ResultPayload, compute_time_ms: u64) -> LayerSignal;

    /// Re-read the model artifact. Returns whether a model is now loaded.
    fn reload(&self) -> bool;

    fn is_loaded(&self) -> bool;
}

// ---------------------------------------------------------------------------
// Default implementation
// ---------------------------------------------------------------------------

pub struct ModelLayer {
    slot: ModelSlot,
}

impl ModelLayer {
    pub fn new(loader: Box<dyn ModelLoader>) -> Self {
        Self {
            slot: ModelSlot::new(loader),
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        let loader = FileModelLoader::from_config(config);
        tracing::info!(
            path = ?loader.path(),
            checksum_pinned = config.sha256.is_some(),
            "model path resolved"
        );
        Self::new(Box::new(loader))
    }
}

impl ModelScorer for ModelLayer {
    fn check(&self, task_type: TaskType, result: &ResultPayload, compute_time_ms: u64) -> LayerSignal {
        let Some(model) = self.slot.current() else {
            return LayerSignal::unavailable(LayerId::Ml, Unavailable::NoModel);
        };

        let features = match extract_features(task_type, result, compute_time_ms) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(task_type = %task_type, error = %e, "feature extraction failed, ml signal skipped");
                return LayerSignal::unavailable(LayerId::Ml, Unavailable::ModelFailure);
            }
        };

        match score_features(model.as_ref(), &features) {
            Ok((score, flags)) => LayerSignal::scored(LayerId::Ml, score, flags),
            Err(e) => {
                tracing::warn!(task_type = %task_type, error = %e, "model inference failed, ml signal skipped");
                LayerSignal::unavailable(LayerId::Ml, Unavailable::ModelFailure)
            }
        }
    }

    fn reload(&self) -> bool {
        self.slot.reload()
    }

    fn is_loaded(&self) -> bool {
        self.slot.is_loaded()
    }
}

/// Map a model's verdict on one feature vector into a layer score.
fn score_features(model: &dyn OutlierModel, features: &[f64]) -> Result<(f64, Vec<String>), ModelError> {
    let classification = model.classify(features)?;
    let anomaly = model.score(features)?;
    if !anomaly.is_finite() {
        return Err(ModelError::Inference(format!("non-finite score {anomaly}")));
    }

    Ok(match classification {
        Classification::Outlier => (
            (OUTLIER_CEILING + anomaly).clamp(0.0, OUTLIER_CEILING),
            vec![format!("ML anomaly detected (score={anomaly:.3})")],
        ),
        Classification::Inlier => ((INLIER_FLOOR + INLIER_SLOPE * anomaly).min(1.0), Vec::new()),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
