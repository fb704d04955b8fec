// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload extraction and validation

use axum::body::Bytes;
use axum::http::StatusCode;
use axum_extra::extract::multipart::{Multipart, MultipartError};
use tracing::{debug, warn};

use crate::api::errors::ApiError;
use crate::vision::image_utils::{is_image_content_type, MAX_IMAGE_SIZE};

/// Multipart field carrying the image
pub const UPLOAD_FIELD: &str = "file";

/// Request body limit for uploads
///
/// Leaves room for multipart framing above the 10MB file limit so that
/// oversized files still get the precise size message.
pub const MAX_UPLOAD_BODY_BYTES: usize = MAX_IMAGE_SIZE + 2 * 1024 * 1024;

/// A validated image upload
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Bytes,
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::FileTooLarge
    } else {
        ApiError::InvalidMultipart(e.body_text())
    }
}

/// Read the `file` field, rejecting non-image content types and files over 10MB
///
/// Other fields are skipped. The content type is checked before the file
/// body is read.
pub async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        if !is_image_content_type(content_type.as_deref()) {
            warn!("Rejected upload with content type {:?}", content_type);
            return Err(ApiError::NotAnImage);
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        if bytes.len() > MAX_IMAGE_SIZE {
            warn!(
                "Rejected upload of {} bytes (max: {} bytes)",
                bytes.len(),
                MAX_IMAGE_SIZE
            );
            return Err(ApiError::FileTooLarge);
        }

        return Ok(Upload {
            file_name,
            content_type: content_type.unwrap_or_default(),
            bytes,
        });
    }

    Err(ApiError::MissingFile)
}
