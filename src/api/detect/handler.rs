// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::upload::read_upload;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::{decode_image_bytes, DetectionMetadata, DetectionResult, ImageSize};

/// POST /detect - Detect objects in an uploaded image
///
/// Accepts `multipart/form-data` with the image in the `file` field.
///
/// # Response
/// - `detected`: Whether at least one object was found
/// - `detections`: `bbox`, `confidence`, `class`, `class_name` per object
/// - `model_info`: Model version, confidence threshold and path
/// - `metadata`: Processing time (seconds), image size and timestamp
///
/// # Errors
/// - 400 Bad Request: Not an image, larger than 10MB, or undecodable
/// - 422 Unprocessable Entity: No `file` field
/// - 500 Internal Server Error: Inference failed
pub async fn detect_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectionResult>, ApiError> {
    let start = Instant::now();

    let mut multipart = multipart.map_err(|rejection| {
        warn!("Rejected detect request: {}", rejection.body_text());
        ApiError::InvalidMultipart(rejection.body_text())
    })?;

    // 1. Validate upload (content type, size)
    let upload = read_upload(&mut multipart).await?;
    debug!(
        "Upload received: {:?} ({}, {} bytes)",
        upload.file_name,
        upload.content_type,
        upload.bytes.len()
    );

    // 2. Decode image
    let (image, image_info) = decode_image_bytes(&upload.bytes).map_err(|e| {
        warn!("Failed to decode image: {}", e);
        ApiError::from(e)
    })?;

    // 3. Run inference off the async workers
    let detector = state.detector.clone();
    let result = tokio::task::spawn_blocking(move || detector.detect(&image))
        .await
        .map_err(|e| ApiError::Detection(e.to_string()))??;

    // 4. Attach request metadata
    let process_time = start.elapsed().as_secs_f64();
    info!(
        "Detection complete: {} objects in {}x{} image, {:.3}s",
        result.detections.len(),
        image_info.width,
        image_info.height,
        process_time
    );

    Ok(Json(result.with_metadata(DetectionMetadata {
        process_time,
        image_size: ImageSize {
            width: image_info.width,
            height: image_info.height,
        },
        timestamp: Utc::now().to_rfc3339(),
    })))
}
