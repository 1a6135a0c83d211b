// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

/// Why a verifier config was refused at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported contract version \"{0}\", expected \"v1\"")]
    UnsupportedVersion(String),

    #[error("thresholds.{name} must be in [0.0, 1.0], got {value}")]
    ThresholdRange { name: &'static str, value: f64 },

    #[error("thresholds.review ({review}) must not exceed thresholds.accept ({accept})")]
    ThresholdOrder { accept: f64, review: f64 },

    #[error("unknown task type \"{name}\" in bounds, expected one of: {expected}")]
    UnknownTaskType { name: String, expected: String },

    #[error("bounds.{task}.{field}.{param} must be {requirement}, got {value}")]
    Bounds {
        task: String,
        field: String,
        param: &'static str,
        requirement: &'static str,
        value: f64,
    },

    #[error("model.sha256 must be a 64-character hex digest, got \"{0}\"")]
    ModelDigest(String),

    #[error("undefined variable ${{{name}}} in {field} (not set in environment)")]
    UndefinedVariable { field: &'static str, name: String },
}
