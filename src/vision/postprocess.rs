// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 output decoding and non-maximum suppression

use anyhow::Result;
use ndarray::{ArrayView2, ArrayViewD, Axis, Ix2};
use std::cmp::Ordering;
use tracing::warn;

use super::detection::{class_name, Detection};
use super::preprocessing::PreprocessInfo;

/// Box coordinates plus cx, cy, w, h precede the class scores
const BOX_ATTRIBUTES: usize = 4;

/// A candidate box in model input space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: usize,
}

impl RawDetection {
    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &RawDetection) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            return 0.0;
        }
        intersection / union
    }
}

/// Decode a YOLOv8 output tensor into candidates at or above `confidence_threshold`
///
/// Accepts `[1, 4 + nc, N]` as exported by Ultralytics, or the transposed
/// `[1, N, 4 + nc]`. Axis 1 holds the attributes unless only the last axis
/// matches `4 + num_classes`.
pub fn decode_predictions(
    output: ArrayViewD<f32>,
    num_classes: usize,
    confidence_threshold: f32,
) -> Result<Vec<RawDetection>> {
    let shape = output.shape().to_vec();
    let predictions = match shape.len() {
        3 if shape[0] == 1 => output
            .index_axis_move(Axis(0), 0)
            .into_dimensionality::<Ix2>()?,
        2 => output.into_dimensionality::<Ix2>()?,
        _ => anyhow::bail!("Unexpected detection output shape: {:?}", shape),
    };

    // Orient as [attributes, candidates]
    let attributes = BOX_ATTRIBUTES + num_classes;
    let predictions: ArrayView2<f32> =
        if predictions.ncols() == attributes && predictions.nrows() != attributes {
            predictions.reversed_axes()
        } else {
            predictions
        };

    if predictions.nrows() <= BOX_ATTRIBUTES {
        anyhow::bail!(
            "Detection output has {} attributes, expected at least {}",
            predictions.nrows(),
            BOX_ATTRIBUTES + 1
        );
    }

    let mut candidates = Vec::new();
    for column in predictions.axis_iter(Axis(1)) {
        let (class_id, confidence) = column
            .iter()
            .skip(BOX_ATTRIBUTES)
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |best, (idx, score)| {
                if score > best.1 {
                    (idx, score)
                } else {
                    best
                }
            });

        if !confidence.is_finite() || confidence < confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (column[0], column[1], column[2], column[3]);
        candidates.push(RawDetection {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
            confidence,
            class_id,
        });
    }

    Ok(candidates)
}

/// Class-aware greedy non-maximum suppression
///
/// Output is sorted by descending confidence and capped at `max_detections`.
pub fn non_max_suppression(
    mut candidates: Vec<RawDetection>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<RawDetection> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
            .then(a.class_id.cmp(&b.class_id))
            .then(a.x1.partial_cmp(&b.x1).unwrap_or(Ordering::Equal))
    });

    let mut kept: Vec<RawDetection> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }

    kept
}

/// Map model-space boxes back onto the uploaded image
///
/// Boxes that collapse to nothing after clipping (entirely inside the
/// letterbox padding) are dropped.
pub fn to_detections(raw: &[RawDetection], info: &PreprocessInfo) -> Vec<Detection> {
    raw.iter()
        .filter_map(|r| {
            let (x1, y1) = info.map_to_original(r.x1, r.y1);
            let (x2, y2) = info.map_to_original(r.x2, r.y2);
            let bbox = [x1 as i32, y1 as i32, x2 as i32, y2 as i32];
            if bbox[2] <= bbox[0] || bbox[3] <= bbox[1] {
                return None;
            }

            let name = class_name(r.class_id);
            if name.is_none() {
                warn!("Class id {} is outside the label table", r.class_id);
            }

            Some(Detection {
                bbox,
                confidence: r.confidence,
                class_id: r.class_id,
                class_name: name.map(str::to_string),
            })
        })
        .collect()
}
