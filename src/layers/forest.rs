// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

// Isolation forest inference over a JSON artifact emitted by the training
// pipeline.
//
// Artifact shape:
//
//   {
//     "format": "isolation-forest/v1",
//     "n_features": 4,
//     "max_samples": 256,
//     "offset": -0.5,
//     "trees": [ { "nodes": [ {"feature": 0, "threshold": 9000.0, "left": 1, "right": 2},
//                             {"samples": 12}, {"samples": 3} ] } ]
//   }
//
// Node 0 is the root; `x[feature] <= threshold` goes left. Child indices must
// be greater than their parent's, which makes every traversal terminate.
// The continuous score is `-2^(-E[h(x)] / c(max_samples)) - offset`: higher
// means more normal and negative means outlier.

use serde::Deserialize;

use super::model::{Classification, ModelError, OutlierModel};

pub const FORMAT_V1: &str = "isolation-forest/v1";

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone, Deserialize)]
pub struct IsolationForest {
    pub format: String,
    pub n_features: usize,
    pub max_samples: usize,
    pub offset: f64,
    pub trees: Vec<IsolationTree>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IsolationTree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        samples: usize,
    },
}

/// Structural problem found in a parsed artifact.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArtifactError {
    #[error("unsupported artifact format \"{0}\", expected \"isolation-forest/v1\"")]
    Format(String),
    #[error("artifact has no trees")]
    NoTrees,
    #[error("max_samples must be >= 1")]
    NoSamples,
    #[error("offset must be finite")]
    Offset,
    #[error("tree {tree} has no nodes")]
    EmptyTree { tree: usize },
    #[error("tree {tree} node {node}: feature {feature} out of range for {n_features} features")]
    FeatureOutOfRange {
        tree: usize,
        node: usize,
        feature: usize,
        n_features: usize,
    },
    #[error("tree {tree} node {node}: child index must be greater than the node's and less than {len}")]
    BadChild { tree: usize, node: usize, len: usize },
    #[error("tree {tree} node {node}: threshold must be finite")]
    Threshold { tree: usize, node: usize },
}

impl IsolationForest {
    /// Parse and validate an artifact from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, String> {
        let forest: IsolationForest =
            serde_json::from_slice(bytes).map_err(|e| format!("invalid artifact JSON: {e}"))?;
        forest.validate().map_err(|e| e.to_string())?;
        Ok(forest)
    }

    /// Check the invariants inference relies on.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.format != FORMAT_V1 {
            return Err(ArtifactError::Format(self.format.clone()));
        }
        if self.trees.is_empty() {
            return Err(ArtifactError::NoTrees);
        }
        if self.max_samples == 0 {
            return Err(ArtifactError::NoSamples);
        }
        if !self.offset.is_finite() {
            return Err(ArtifactError::Offset);
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(ArtifactError::EmptyTree { tree: t });
            }
            let len = tree.nodes.len();
            for (n, node) in tree.nodes.iter().enumerate() {
                if let Node::Split { feature, threshold, left, right } = node {
                    if *feature >= self.n_features {
                        return Err(ArtifactError::FeatureOutOfRange {
                            tree: t,
                            node: n,
                            feature: *feature,
                            n_features: self.n_features,
                        });
                    }
                    if !threshold.is_finite() {
                        return Err(ArtifactError::Threshold { tree: t, node: n });
                    }
                    for child in [*left, *right] {
                        if child <= n || child >= len {
                            return Err(ArtifactError::BadChild { tree: t, node: n, len });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn check_input(&self, features: &[f64]) -> Result<(), ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::FeatureCount {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        if let Some(index) = features.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite { index });
        }
        Ok(())
    }

    fn mean_path_length(&self, features: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.path_length(features)).sum();
        total / self.trees.len() as f64
    }
}

impl IsolationTree {
    fn path_length(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        let mut depth = 0.0;
        loop {
            match &self.nodes[idx] {
                Node::Split { feature, threshold, left, right } => {
                    idx = if features[*feature] <= *threshold { *left } else { *right };
                    depth += 1.0;
                }
                Node::Leaf { samples } => return depth + average_path_length(*samples),
            }
        }
    }
}

/// Average path length of an unsuccessful BST search over `n` samples.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

impl OutlierModel for IsolationForest {
    fn classify(&self, features: &[f64]) -> Result<Classification, ModelError> {
        let score = self.score(features)?;
        Ok(if score < 0.0 {
            Classification::Outlier
        } else {
            Classification::Inlier
        })
    }

    fn score(&self, features: &[f64]) -> Result<f64, ModelError> {
        self.check_input(features)?;
        let normalizer = average_path_length(self.max_samples).max(f64::MIN_POSITIVE);
        let normalized = self.mean_path_length(features) / normalizer;
        Ok(-(2f64.powf(-normalized)) - self.offset)
    }
}
