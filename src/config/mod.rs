// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

// Config loader and validator.
//
// Loads proofcheck.yaml from disk or memory, merges the embedded default
// bounds table, expands `${VAR}` references, validates ranges, and computes a
// deterministic contract hash.

mod defaults;
mod error;
mod interpolation;
mod loader;
mod raw;
mod types;

pub use error::ConfigError;
pub use loader::{compute_hash, load_config_file, load_config_str};
pub use types::*;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
