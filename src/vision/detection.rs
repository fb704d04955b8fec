// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection result types returned by `POST /detect`

use serde::{Deserialize, Serialize};

/// Labels of the fixed model class space, indexed by class id
pub const CLASS_NAMES: &[&str] = &["carcaca"];

/// Resolve a class id into its label
///
/// Returns `None` for ids outside the label table.
pub fn class_name(class_id: usize) -> Option<&'static str> {
    CLASS_NAMES.get(class_id).copied()
}

/// One detected object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// `[x1, y1, x2, y2]` in pixel coordinates of the uploaded image
    pub bbox: [i32; 4],
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// Class id in the model label space
    #[serde(rename = "class")]
    pub class_id: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

/// Model details echoed back with each result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub version: String,
    pub confidence_threshold: f32,
    pub model_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Request metadata attached by the HTTP layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionMetadata {
    /// Wall-clock seconds spent in the handler
    pub process_time: f64,
    pub image_size: ImageSize,
    /// RFC 3339 timestamp
    pub timestamp: String,
}

/// Result of running the detector on one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub detected: bool,
    pub detections: Vec<Detection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_info: Option<ModelInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DetectionMetadata>,
}

impl DetectionResult {
    pub fn new(detections: Vec<Detection>, model_info: Option<ModelInfo>) -> Self {
        Self {
            detected: !detections.is_empty(),
            detections,
            model_info,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: DetectionMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
