// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

// Trained-model artifact path resolution.
//
// Resolution order:
//   1. `config_path` (from YAML `model.path`)
//   2. `$PROOFCHECK_MODEL_PATH` environment variable
//   3. `~/.proofcheck/models/model.json` (platform default)

use std::path::{Path, PathBuf};

pub const MODEL_PATH_ENV: &str = "PROOFCHECK_MODEL_PATH";

pub const DEFAULT_MODEL_FILE: &str = "model.json";

/// Resolve the location of the trained model artifact.
///
/// Precedence: `config_path` > `$PROOFCHECK_MODEL_PATH` > home default.
///
/// Returns `None` only if no home directory can be determined and neither
/// of the explicit overrides are set.
pub fn resolve_model_path(config_path: Option<&Path>) -> Option<PathBuf> {
    // 1. Explicit config override.
    if let Some(path) = config_path {
        return Some(path.to_path_buf());
    }

    // 2. Environment variable.
    if let Ok(path) = std::env::var(MODEL_PATH_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // 3. Platform default.
    dirs::home_dir().map(|h| h.join(".proofcheck").join("models").join(DEFAULT_MODEL_FILE))
}
