// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

use super::raw::{RawBoundsTable, RawDefaultBounds};

/// The default bounds YAML, embedded at compile time.
const DEFAULT_BOUNDS_YAML: &str = include_str!("../../schema/default_bounds.yaml");

/// Parse the embedded default bounds table.
/// Called once at startup. Panics on invalid YAML (this is our own file).
pub fn default_bounds() -> RawBoundsTable {
    let raw: RawDefaultBounds =
        serde_yaml::from_str(DEFAULT_BOUNDS_YAML).expect("default bounds YAML is invalid");
    raw.bounds
}
