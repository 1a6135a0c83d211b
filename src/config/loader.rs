// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::payload::TaskType;
use crate::signal::Thresholds;

use super::defaults::default_bounds;
use super::error::ConfigError;
use super::interpolation::{expand_env, expand_env_opt};
use super::raw;
use super::types::*;

/// Read and validate a verifier config file.
pub fn load_config_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_str(&yaml)
}

/// Validate a verifier config held in memory.
///
/// Steps:
/// 1. Compute SHA256 contract hash over the text as written
/// 2. Parse YAML into raw deserialization types
/// 3. Validate version and thresholds
/// 4. Merge the embedded default bounds under user rows, then validate them
/// 5. Expand `${VAR}` in the string fields (environment, model path, digest)
/// 6. Build typed Config struct
pub fn load_config_str(yaml: &str) -> Result<Config, ConfigError> {
    let contract_hash = compute_hash(yaml);

    let raw: raw::RawConfig = serde_yaml::from_str(yaml)?;

    if raw.verifier != "v1" {
        return Err(ConfigError::UnsupportedVersion(raw.verifier));
    }

    let thresholds = build_thresholds(raw.thresholds)?;

    // Bounds: defaults first, then user rows override field by field.
    let mut merged = if raw.use_default_bounds != Some(false) {
        default_bounds()
    } else {
        raw::RawBoundsTable::new()
    };
    for (task, fields) in raw.bounds {
        merged.entry(task).or_default().extend(fields);
    }
    let bounds = build_bounds_table(merged)?;

    let model = build_model_config(raw.model)?;
    let environment = expand_env_opt("environment", raw.environment)?.unwrap_or_default();

    Ok(Config {
        policy: PolicyConfig {
            version: raw.verifier,
            thresholds,
            bounds,
        },
        runtime: RuntimeConfig { model, environment },
        contract_hash,
    })
}

pub fn compute_hash(raw_yaml: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_yaml.as_bytes());
    let hash = hasher.finalize();
    format!("sha256:{:x}", hash)
}

fn build_thresholds(raw: Option<raw::RawThresholds>) -> Result<Thresholds, ConfigError> {
    let defaults = Thresholds::default();
    let (accept, review) = match raw {
        Some(t) => (
            t.accept.unwrap_or(defaults.accept),
            t.review.unwrap_or(defaults.review),
        ),
        None => return Ok(defaults),
    };

    fn validate_unit(name: &'static str, value: f64) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::ThresholdRange { name, value });
        }
        Ok(())
    }
    validate_unit("accept", accept)?;
    validate_unit("review", review)?;

    if review > accept {
        return Err(ConfigError::ThresholdOrder { accept, review });
    }

    Ok(Thresholds { accept, review })
}

fn build_bounds_table(raw: raw::RawBoundsTable) -> Result<BoundsTable, ConfigError> {
    let mut table = BoundsTable::new();
    for (task_name, fields) in raw {
        let task: TaskType = task_name.parse().map_err(|_| ConfigError::UnknownTaskType {
            name: task_name.clone(),
            expected: TaskType::ALL.map(|t| t.as_str()).join(", "),
        })?;

        let mut row = BoundsRow::new();
        for (field, b) in fields {
            let bad = |param: &'static str, requirement: &'static str, value: f64| ConfigError::Bounds {
                task: task_name.clone(),
                field: field.clone(),
                param,
                requirement,
                value,
            };
            if !b.mean.is_finite() {
                return Err(bad("mean", "finite", b.mean));
            }
            if !b.std.is_finite() || b.std < 0.0 {
                return Err(bad("std", "finite and >= 0", b.std));
            }
            row.insert(field, FieldBounds { mean: b.mean, std: b.std });
        }
        table.insert(task, row);
    }
    Ok(table)
}

fn build_model_config(raw: Option<raw::RawModelConfig>) -> Result<ModelConfig, ConfigError> {
    let raw = match raw {
        Some(r) => r,
        None => return Ok(ModelConfig::default()),
    };

    let path = expand_env_opt("model.path", raw.path)?.map(PathBuf::from);

    let sha256 = match raw.sha256 {
        Some(h) => {
            let h = expand_env("model.sha256", &h)?.trim().to_ascii_lowercase();
            if h.len() != 64 || !h.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::ModelDigest(h));
            }
            Some(h)
        }
        None => None,
    };

    Ok(ModelConfig { path, sha256 })
}
