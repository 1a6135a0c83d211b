// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

// Raw YAML deserialization types (internal).
// Kept apart from the typed Config: task-type keys are parsed, variables are
// interpolated and numeric ranges are validated between raw and typed.

use serde::Deserialize;
use std::collections::BTreeMap;

/// task type name -> field name -> bounds
pub type RawBoundsTable = BTreeMap<String, BTreeMap<String, RawFieldBounds>>;

#[derive(Debug, Deserialize)]
pub struct RawConfig {
    pub verifier: String,
    pub thresholds: Option<RawThresholds>,
    pub model: Option<RawModelConfig>,
    #[serde(default)]
    pub bounds: RawBoundsTable,
    /// If false, skip the embedded default bounds table. Default: true.
    pub use_default_bounds: Option<bool>,
    pub environment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawThresholds {
    pub accept: Option<f64>,
    pub review: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RawModelConfig {
    pub path: Option<String>,
    pub sha256: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawFieldBounds {
    pub mean: f64,
    pub std: f64,
}

/// Shape of the embedded defaults file.
#[derive(Debug, Deserialize)]
pub struct RawDefaultBounds {
    pub bounds: RawBoundsTable,
}
