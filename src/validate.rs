// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

// Structural validation: per-task-type field presence and type checks.
//
// Runs before any scoring. Value ranges are not checked here; that is the
// statistical layer's job.

use std::fmt;

use serde_json::Value;

use crate::payload::{kind_name, ResultPayload, TaskType};

// ---------------------------------------------------------------------------
// Schema table
// ---------------------------------------------------------------------------

/// Expected runtime kind of a result field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Any JSON number (integral or not). Booleans never qualify.
    Number,
    /// Integral JSON number only.
    Integer,
    String,
    Boolean,
    Mapping,
}

impl FieldKind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::Number => value.is_number(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::String => value.is_string(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Mapping => value.is_object(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Number => "number",
            FieldKind::Integer => "integer",
            FieldKind::String => "string",
            FieldKind::Boolean => "boolean",
            FieldKind::Mapping => "mapping",
        }
    }
}

/// One declared field of a task-type schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn required(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind, required: true }
}

const fn optional(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind, required: false }
}

const PROTEIN: &[FieldSpec] = &[
    required("finalEnergy", FieldKind::Number),
    required("iterations", FieldKind::Integer),
    required("residueCount", FieldKind::Integer),
];

const CLIMATE: &[FieldSpec] = &[
    required("gridSize", FieldKind::Integer),
    required("timeSteps", FieldKind::Integer),
    required("maxTemperature", FieldKind::Number),
    required("avgTemperature", FieldKind::Number),
    required("centerTemp", FieldKind::Number),
];

const SIGNAL: &[FieldSpec] = &[
    required("sampleRate", FieldKind::Integer),
    required("duration", FieldKind::Number),
    required("numSamples", FieldKind::Integer),
    required("fftSize", FieldKind::Integer),
    required("maxMagnitude", FieldKind::Number),
];

const DRUGSCREEN: &[FieldSpec] = &[
    required("compoundName", FieldKind::String),
    required("bindingAffinity", FieldKind::Number),
    required("interactionCount", FieldKind::Integer),
    required("orientationsScanned", FieldKind::Integer),
];

const FITNESS_VERIFY: &[FieldSpec] = &[
    required("checks", FieldKind::Mapping),
    optional("confidence", FieldKind::Number),
    optional("verified", FieldKind::Boolean),
];

/// Declared fields for a task type, in validation order.
pub fn schema_for(task_type: TaskType) -> &'static [FieldSpec] {
    match task_type {
        TaskType::Protein => PROTEIN,
        TaskType::Climate => CLIMATE,
        TaskType::Signal => SIGNAL,
        TaskType::Drugscreen => DRUGSCREEN,
        TaskType::FitnessVerify => FITNESS_VERIFY,
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A single structural problem with a submitted result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    UnknownTaskType(String),
    Missing(&'static str),
    WrongType {
        field: &'static str,
        expected: FieldKind,
        actual: &'static str,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::UnknownTaskType(name) => write!(f, "unknown task type: {name}"),
            FieldError::Missing(field) => write!(f, "missing field: {field}"),
            FieldError::WrongType { field, expected, actual } => write!(
                f,
                "invalid type for {field}: expected {}, got {actual}",
                expected.as_str()
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check `result` against the schema of an already-parsed task type.
///
/// Returns every problem found, in schema order. Empty = valid.
pub fn validate_fields(task_type: TaskType, result: &ResultPayload) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for spec in schema_for(task_type) {
        match result.get(spec.name) {
            None if spec.required => errors.push(FieldError::Missing(spec.name)),
            None => {}
            Some(value) if !spec.kind.matches(value) => errors.push(FieldError::WrongType {
                field: spec.name,
                expected: spec.kind,
                actual: kind_name(value),
            }),
            Some(_) => {}
        }
    }
    errors
}

/// Parse the task type and check the result structure.
///
/// On success returns the parsed task type. An unknown task type yields a
/// single error and no field checks.
pub fn check_structure(task_type: &str, result: &ResultPayload) -> Result<TaskType, Vec<FieldError>> {
    let parsed: TaskType = task_type
        .parse()
        .map_err(|_| vec![FieldError::UnknownTaskType(task_type.to_string())])?;
    let errors = validate_fields(parsed, result);
    if errors.is_empty() {
        Ok(parsed)
    } else {
        Err(errors)
    }
}

/// Validate a result for a task type given by name.
///
/// Returns human-readable error strings. Empty list = structurally valid.
pub fn validate(task_type: &str, result: &ResultPayload) -> Vec<String> {
    match check_structure(task_type, result) {
        Ok(_) => Vec::new(),
        Err(errors) => errors.iter().map(ToString::to_string).collect(),
    }
}
