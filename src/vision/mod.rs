// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for object detection
//!
//! This module provides:
//! - Decoding of uploaded images
//! - Letterbox preprocessing and YOLOv8 output decoding
//! - The `ObjectDetector` seam and its ONNX Runtime implementation
//!
//! Inference runs on CPU only.

pub mod detection;
pub mod detector;
pub mod image_utils;
pub mod postprocess;
pub mod preprocessing;

pub use detection::{
    class_name, Detection, DetectionMetadata, DetectionResult, ImageSize, ModelInfo, CLASS_NAMES,
};
pub use detector::{DetectorConfig, DetectorError, ObjectDetector, YoloDetector};
pub use image_utils::{decode_image_bytes, detect_format, ImageError, ImageInfo, MAX_IMAGE_SIZE};
