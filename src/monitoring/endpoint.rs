// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// src/monitoring/endpoint.rs - Per-endpoint latency monitoring middleware

use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

use super::system::log_system_metrics;

/// Responses slower than this are flagged by default
pub const DEFAULT_SLOW_RESPONSE_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointStatus {
    Success,
    Error,
}

impl EndpointStatus {
    pub fn from_status_code(status: StatusCode) -> Self {
        if status.is_client_error() || status.is_server_error() {
            EndpointStatus::Error
        } else {
            EndpointStatus::Success
        }
    }
}

/// Timing record for one handled request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointMetrics {
    pub endpoint: String,
    pub status: EndpointStatus,
    pub execution_time_ms: f64,
    pub timestamp: String,
}

impl EndpointMetrics {
    pub fn new(endpoint: impl Into<String>, status: EndpointStatus, execution_time_ms: f64) -> Self {
        Self {
            endpoint: endpoint.into(),
            status,
            execution_time_ms,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn is_slow(&self, slow_response_ms: u64) -> bool {
        self.execution_time_ms > slow_response_ms as f64
    }
}

/// Settings for [`monitor_endpoint`]
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub slow_response_ms: u64,
    /// Take a system snapshot after every monitored request
    pub snapshot_system_metrics: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            slow_response_ms: DEFAULT_SLOW_RESPONSE_MS,
            snapshot_system_metrics: true,
        }
    }
}

/// Log endpoint metrics, warning when the response was slow
///
/// Returns whether the slow-response warning fired.
pub fn record_endpoint_metrics(metrics: &EndpointMetrics, slow_response_ms: u64) -> bool {
    info!(
        "Endpoint metrics: {}",
        serde_json::to_string(metrics).unwrap_or_default()
    );

    let slow = metrics.is_slow(slow_response_ms);
    if slow {
        warn!(
            "High response time on {}: {:.1}ms",
            metrics.endpoint, metrics.execution_time_ms
        );
    }
    slow
}

/// Middleware timing the wrapped route
///
/// Observes only: the inner response is returned untouched. The system
/// snapshot runs on the blocking pool after the response is produced.
pub async fn monitor_endpoint(
    State(config): State<MonitorConfig>,
    matched_path: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    let endpoint = matched_path
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let execution_time_ms = start.elapsed().as_secs_f64() * 1000.0;

    let metrics = EndpointMetrics::new(
        endpoint,
        EndpointStatus::from_status_code(response.status()),
        execution_time_ms,
    );
    record_endpoint_metrics(&metrics, config.slow_response_ms);

    if config.snapshot_system_metrics {
        tokio::task::spawn_blocking(log_system_metrics);
    }

    response
}
