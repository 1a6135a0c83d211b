// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::payload::TaskType;
use crate::signal::Thresholds;

// ---------------------------------------------------------------------------
// Top-level config (combines policy + runtime)
// ---------------------------------------------------------------------------

/// Top-level parsed and validated verifier config.
///
/// Built once at startup and shared read-only for the life of the process.
#[derive(Debug)]
pub struct Config {
    /// Scoring policy: thresholds and bounds.
    pub policy: PolicyConfig,
    /// Runtime configuration: model location, environment label.
    pub runtime: RuntimeConfig,
    /// SHA256 hash of the raw YAML: "sha256:{hex}".
    pub contract_hash: String,
}

impl Config {
    pub fn version(&self) -> &str {
        &self.policy.version
    }

    /// Bounds row for a task type, if any is configured.
    pub fn bounds_for(&self, task_type: TaskType) -> Option<&BoundsRow> {
        self.policy.bounds.get(&task_type)
    }
}

// ---------------------------------------------------------------------------
// Policy config
// ---------------------------------------------------------------------------

/// Everything that decides how a result is scored.
#[derive(Debug)]
pub struct PolicyConfig {
    /// Contract version. Always "v1".
    pub version: String,
    /// Recommendation cut points.
    pub thresholds: Thresholds,
    /// Expected (mean, std) per task type and field.
    pub bounds: BoundsTable,
}

/// Expected distribution of one numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBounds {
    pub mean: f64,
    pub std: f64,
}

/// field name -> bounds. Ordered so that flag output is deterministic.
pub type BoundsRow = BTreeMap<String, FieldBounds>;

/// task type -> bounds row.
pub type BoundsTable = BTreeMap<TaskType, BoundsRow>;

// ---------------------------------------------------------------------------
// Runtime config
// ---------------------------------------------------------------------------

/// Runtime configuration that varies by deployment.
#[derive(Debug, Default)]
pub struct RuntimeConfig {
    pub model: ModelConfig,
    /// Environment label (e.g. "development", "production").
    pub environment: String,
}

/// Where to find the trained outlier model.
#[derive(Debug, Clone, Default)]
pub struct ModelConfig {
    /// Explicit artifact path. `None` falls back to env / home default.
    pub path: Option<PathBuf>,
    /// Expected SHA256 hex digest of the artifact. `None` skips the check.
    pub sha256: Option<String>,
}
