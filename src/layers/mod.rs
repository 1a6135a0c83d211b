// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

// Verification layers (bounds, outlier model, peer consistency, fitness)

pub mod bounds;
pub mod consistency;
pub mod features;
pub mod fitness;
pub mod forest;
pub mod model;
