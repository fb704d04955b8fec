// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection API endpoint module
//!
//! Provides POST /detect for running the object detector on an uploaded image.

pub mod handler;
pub mod upload;

pub use handler::detect_handler;
pub use upload::{read_upload, Upload, MAX_UPLOAD_BODY_BYTES, UPLOAD_FIELD};
