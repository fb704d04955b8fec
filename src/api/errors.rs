// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::monitoring::MetricsError;
use crate::vision::{DetectorError, ImageError};

/// Body of every handled error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Body returned when a request fails in an unexpected way
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnhandledErrorResponse {
    pub status: String,
    pub detail: String,
    pub path: String,
}

impl UnhandledErrorResponse {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            detail: "Internal server error".to_string(),
            path: path.into(),
        }
    }
}

/// Errors surfaced at the HTTP boundary
///
/// The display string is the client-facing `detail`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("File must be an image")]
    NotAnImage,

    #[error("File size too large. Maximum size is 10MB")]
    FileTooLarge,

    #[error("Invalid image format")]
    InvalidImage,

    #[error("Field 'file' is required")]
    MissingFile,

    #[error("Invalid multipart body: {0}")]
    InvalidMultipart(String),

    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("Health check failed: {0}")]
    HealthCheck(String),

    #[error("Not Found")]
    NotFound,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotAnImage
            | ApiError::FileTooLarge
            | ApiError::InvalidImage
            | ApiError::InvalidMultipart(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingFile => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Detection(_) | ApiError::HealthCheck(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            detail: self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}", self);
        }
        (status, Json(self.to_response())).into_response()
    }
}

impl From<DetectorError> for ApiError {
    fn from(e: DetectorError) -> Self {
        ApiError::Detection(e.to_string())
    }
}

impl From<MetricsError> for ApiError {
    fn from(e: MetricsError) -> Self {
        ApiError::HealthCheck(e.to_string())
    }
}

impl From<ImageError> for ApiError {
    fn from(e: ImageError) -> Self {
        match e {
            ImageError::TooLarge(_, _) => ApiError::FileTooLarge,
            ImageError::UnsupportedFormat | ImageError::DecodeFailed(_) | ImageError::EmptyData => {
                ApiError::InvalidImage
            }
        }
    }
}
