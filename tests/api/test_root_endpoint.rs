// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Root endpoint tests for GET /
//!
//! These tests verify that:
//! - The service reports its name, version and `online` status
//! - Every response carries the X-Process-Time header
//! - Unknown routes return a JSON 404

use axum::http::StatusCode;
use carcass_detection_api::version::VERSION;
use std::sync::Arc;
use tower::util::ServiceExt;

use super::common::*;

#[cfg(test)]
mod root_tests {
    use super::*;

    /// Test 1: status document
    #[tokio::test]
    async fn test_root_reports_online() {
        let response = app_with(Arc::new(StubDetector::loaded()))
            .oneshot(get_request("/"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["name"], "Carcass Detection API");
        assert_eq!(json["version"], VERSION);
        assert_eq!(json["status"], "online");
        assert!(json["timestamp"].is_string());
    }

    /// Test 2: root answers even without a model
    #[tokio::test]
    async fn test_root_without_model() {
        let response = app_with(Arc::new(StubDetector::unloaded()))
            .oneshot(get_request("/"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "online");
    }

    /// Test 3: process time header is a non-negative number of seconds
    #[tokio::test]
    async fn test_process_time_header() {
        let response = app_with(Arc::new(StubDetector::loaded()))
            .oneshot(get_request("/"))
            .await
            .unwrap();

        let header = response
            .headers()
            .get("x-process-time")
            .expect("X-Process-Time header missing");
        let seconds: f64 = header.to_str().unwrap().parse().unwrap();
        assert!(seconds >= 0.0);
    }

    /// Test 4: unknown routes get a JSON 404 and still carry the header
    #[tokio::test]
    async fn test_unknown_route() {
        let response = app_with(Arc::new(StubDetector::loaded()))
            .oneshot(get_request("/v1/inference"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("x-process-time"));
        assert_eq!(body_json(response).await["detail"], "Not Found");
    }
}
