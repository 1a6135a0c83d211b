// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

// Peer consistency layer: compares the candidate's numeric fields with the
// same positions in peer results for the same task.
//
// Peers are compared positionally, so a peer whose flattened vector has a
// different length than the candidate's is discarded.

use crate::payload::{flatten_numeric, ResultPayload};
use crate::signal::{LayerId, LayerSignal, Unavailable};

/// Max |z| above which the layer penalizes.
pub const PEER_Z_LIMIT: f64 = 2.0;
/// Score lost per unit of z beyond `PEER_Z_LIMIT`.
pub const PEER_Z_SLOPE: f64 = 0.25;
/// Floor for the per-position peer standard deviation.
const STD_FLOOR: f64 = 0.001;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Scores a result against results submitted by other nodes.
pub trait ConsistencyChecker: Send + Sync {
    fn check(&self, result: &ResultPayload, peers: &[ResultPayload]) -> LayerSignal;
}

// ---------------------------------------------------------------------------
// Default implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct PeerConsistencyChecker;

impl PeerConsistencyChecker {
    pub fn new() -> Self {
        Self
    }
}

impl ConsistencyChecker for PeerConsistencyChecker {
    fn check(&self, result: &ResultPayload, peers: &[ResultPayload]) -> LayerSignal {
        if peers.is_empty() {
            return LayerSignal::unavailable(LayerId::Consistency, Unavailable::NoPeers);
        }

        let ours = flatten_numeric(result);
        if ours.is_empty() {
            return LayerSignal::unavailable(LayerId::Consistency, Unavailable::NoNumericFields);
        }

        let comparable: Vec<Vec<f64>> = peers
            .iter()
            .map(flatten_numeric)
            .filter(|v| v.len() == ours.len())
            .collect();
        if comparable.is_empty() {
            return LayerSignal::unavailable(LayerId::Consistency, Unavailable::NoPeers);
        }

        let max_z = max_peer_z(&ours, &comparable);
        if max_z > PEER_Z_LIMIT {
            let flag = format!("peer consistency: max z-score={max_z:.1} (>2σ)");
            let score = 1.0 - (max_z - PEER_Z_LIMIT) * PEER_Z_SLOPE;
            LayerSignal::scored(LayerId::Consistency, score, vec![flag])
        } else {
            LayerSignal::scored(LayerId::Consistency, 1.0, Vec::new())
        }
    }
}

/// Largest |z| of the candidate against the per-position peer distribution.
///
/// Uses the population standard deviation. Every peer vector must have the
/// candidate's length.
fn max_peer_z(ours: &[f64], peers: &[Vec<f64>]) -> f64 {
    let n = peers.len() as f64;
    let mut max_z: f64 = 0.0;

    for (pos, &value) in ours.iter().enumerate() {
        let mean = peers.iter().map(|p| p[pos]).sum::<f64>() / n;
        let variance = peers.iter().map(|p| (p[pos] - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt().max(STD_FLOOR);
        let z = (value - mean).abs() / std;
        // f64::max ignores NaN; an infinite z still propagates.
        max_z = max_z.max(z);
    }

    max_z
}
