// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

pub mod config;
pub mod engine;
pub mod layers;
pub mod model_path;
pub mod payload;
pub mod server;
pub mod signal;
pub mod validate;
