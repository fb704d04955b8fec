// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Health endpoint tests for GET /health
//!
//! These tests verify that:
//! - The endpoint reports whether the model is loaded
//! - A live system snapshot is included
//! - The route is served at the root and under the API prefix

use axum::http::StatusCode;
use carcass_detection_api::monitoring::collect_system_metrics;
use std::sync::Arc;
use tower::util::ServiceExt;

use super::common::*;

/// Hosts without a readable disk or memory table fail the check with 500
fn metrics_available() -> bool {
    match collect_system_metrics() {
        Ok(_) => true,
        Err(e) => {
            eprintln!("System metrics unavailable on this host: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod health_tests {
    use super::*;

    /// Test 0: metrics failures surface as 500 with a JSON detail
    #[tokio::test]
    async fn test_health_reflects_metrics_availability() {
        let available = metrics_available();
        let response = app_with(Arc::new(StubDetector::loaded()))
            .oneshot(get_request("/health"))
            .await
            .unwrap();

        if available {
            assert_eq!(response.status(), StatusCode::OK);
        } else {
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let detail = body_json(response).await["detail"].as_str().unwrap().to_string();
            assert!(detail.starts_with("Health check failed"));
        }
    }

    /// Test 1: loaded model is reported
    #[tokio::test]
    async fn test_health_model_loaded() {
        if !metrics_available() {
            return;
        }
        let response = app_with(Arc::new(StubDetector::loaded()))
            .oneshot(get_request("/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["model_loaded"], true);
        assert!(json["timestamp"].is_string());
    }

    /// Test 2: missing model is reported without failing the check
    #[tokio::test]
    async fn test_health_model_not_loaded() {
        if !metrics_available() {
            return;
        }
        let response = app_with(Arc::new(StubDetector::unloaded()))
            .oneshot(get_request("/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["model_loaded"], false);
    }

    /// Test 3: system snapshot fields are present and in range
    #[tokio::test]
    async fn test_health_system_info() {
        if !metrics_available() {
            return;
        }
        let response = app_with(Arc::new(StubDetector::loaded()))
            .oneshot(get_request("/health"))
            .await
            .unwrap();

        let json = body_json(response).await;
        let info = &json["system_info"];

        for key in ["cpu_percent", "memory_percent", "disk_percent"] {
            let value = info[key].as_f64().unwrap_or_else(|| panic!("missing {key}"));
            assert!((0.0..=100.0).contains(&value), "{key} = {value}");
        }
        assert!(info["memory_used_mb"].as_f64().unwrap() >= 0.0);
        assert!(info["disk_free_gb"].as_f64().unwrap() >= 0.0);
        assert!(info["timestamp"].is_string());
    }

    /// Test 4: prefixed route
    #[tokio::test]
    async fn test_health_under_api_prefix() {
        if !metrics_available() {
            return;
        }
        let response = app_with(Arc::new(StubDetector::loaded()))
            .oneshot(get_request("/api/v1/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
