// Copyright 2026 The Proofcheck Project
// SPDX-License-Identifier: Apache-2.0

// HTTP transport
//
// Responsibilities:
// - POST /verify: score one submitted result
// - POST /reload-model: re-read the model artifact
// - GET /health: readiness, model status and contract hash
// - 400 with the validator's field errors for structural rejections

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::engine::{RequestError, VerificationEngine, VerificationResult};
use crate::payload::VerifyRequest;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub version: String,
    pub contract_hash: String,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub status: &'static str,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

/// Errors a handler can return.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Rejected(#[from] RequestError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match &self {
            ServerError::Rejected(e) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    detail: "invalid result structure".to_string(),
                    errors: e.errors().to_vec(),
                },
            ),
            ServerError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    detail: "internal error".to_string(),
                    errors: Vec::new(),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// Shared state injected into axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<VerificationEngine>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Verification is bounded CPU work, so it runs inline on the handler task.
pub async fn verify_handler(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerificationResult>, ServerError> {
    Ok(Json(state.engine.verify(&request)?))
}

/// Reload reads the artifact from disk, so it runs on the blocking pool.
pub async fn reload_handler(State(state): State<AppState>) -> Result<Json<ReloadResponse>, ServerError> {
    let engine = state.engine.clone();
    let model_loaded = tokio::task::spawn_blocking(move || engine.reload_model())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "model reload task failed");
            ServerError::Internal(e.to_string())
        })?;

    Ok(Json(ReloadResponse {
        status: "ok",
        model_loaded,
    }))
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = state.engine.config();
    Json(HealthResponse {
        status: "ok",
        model_loaded: state.engine.model_loaded(),
        version: config.version().to_string(),
        contract_hash: config.contract_hash.clone(),
    })
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(engine: Arc<VerificationEngine>) -> Router {
    let state = AppState { engine };

    Router::new()
        .route("/verify", post(verify_handler))
        .route("/reload-model", post(reload_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}
