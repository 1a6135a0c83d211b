// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

use super::error::ConfigError;

/// Expand `${NAME}` references in one string-valued config field.
///
/// `field` is the dotted config key, reported when a variable is unset.
/// An unterminated `${` or an empty `${}` is kept as written.
pub fn expand_env(field: &'static str, input: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                let value = std::env::var(name).map_err(|_| ConfigError::UndefinedVariable {
                    field,
                    name: name.to_string(),
                })?;
                out.push_str(&value);
                rest = &after[end + 1..];
            }
            _ => {
                out.push_str("${");
                rest = after;
            }
        }
    }
    out.push_str(rest);

    Ok(out)
}

/// Expand an optional field; absent stays absent.
pub fn expand_env_opt(field: &'static str, input: Option<String>) -> Result<Option<String>, ConfigError> {
    input.map(|v| expand_env(field, &v)).transpose()
}
