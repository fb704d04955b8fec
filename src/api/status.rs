// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Status endpoints: `GET /` and `GET /health`

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::ApiError;
use super::http_server::AppState;
use crate::monitoring::{sample_system_metrics, SystemMetrics};
use crate::version::VERSION;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub timestamp: String,
    pub system_info: SystemMetrics,
}

/// GET / - Static service status
pub async fn root_handler(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        name: state.settings.project_name.clone(),
        version: VERSION.to_string(),
        status: "online".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// GET /health - Model availability plus a system resource snapshot
///
/// # Errors
/// - 500 Internal Server Error: system metrics could not be collected
pub async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let model_loaded = state.detector.is_loaded();
    let system_info = sample_system_metrics().await?;

    debug!("Health check: model_loaded={}", model_loaded);

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded,
        timestamp: Utc::now().to_rfc3339(),
        system_info,
    }))
}
