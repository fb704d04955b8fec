// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end postprocessing tests on synthetic YOLOv8 output
//!
//! Letterbox an image, build a raw output tensor in model space, then decode,
//! suppress and map boxes back onto the original image.

use carcass_detection_api::vision::postprocess::{
    decode_predictions, non_max_suppression, to_detections,
};
use carcass_detection_api::vision::preprocessing::{preprocess_for_yolo, PreprocessInfo};
use image::{DynamicImage, Rgb, RgbImage};
use ndarray::Array3;

/// Candidates as (cx, cy, w, h, score) for a single-class model
const CANDIDATES: [(f32, f32, f32, f32, f32); 3] = [
    (320.0, 320.0, 100.0, 50.0, 0.9),
    (322.0, 321.0, 100.0, 50.0, 0.8),
    (100.0, 200.0, 40.0, 40.0, 0.5),
];

/// Output in the exported `[1, 5, N]` layout
fn channels_first() -> Array3<f32> {
    let mut output = Array3::<f32>::zeros((1, 5, CANDIDATES.len()));
    for (i, (cx, cy, w, h, score)) in CANDIDATES.iter().enumerate() {
        output[[0, 0, i]] = *cx;
        output[[0, 1, i]] = *cy;
        output[[0, 2, i]] = *w;
        output[[0, 3, i]] = *h;
        output[[0, 4, i]] = *score;
    }
    output
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;

    #[test]
    fn test_letterbox_for_wide_image() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(1280, 640, Rgb([255, 0, 0])));
        let (tensor, info) = preprocess_for_yolo(&image, 640);

        assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
        assert_eq!(info.scaled_width, 640);
        assert_eq!(info.scaled_height, 320);
        assert_eq!(info.offset_x, 0);
        assert_eq!(info.offset_y, 160);

        // Padding rows are grey, image rows carry the red channel
        let grey = 114.0 / 255.0;
        assert!((tensor[[0, 0, 10, 320]] - grey).abs() < 0.01);
        assert!((tensor[[0, 0, 320, 320]] - 1.0).abs() < 0.01);
        assert!(tensor[[0, 1, 320, 320]].abs() < 0.01);
    }

    #[test]
    fn test_decode_suppress_and_map() {
        let info = PreprocessInfo::from_dimensions(1280, 640, 640);
        let output = channels_first();

        let candidates = decode_predictions(output.view().into_dyn(), 1, 0.7).unwrap();
        assert_eq!(candidates.len(), 2);

        let kept = non_max_suppression(candidates, 0.7, 300);
        assert_eq!(kept.len(), 1);
        assert!((kept[0].confidence - 0.9).abs() < 1e-6);

        let detections = to_detections(&kept, &info);
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].bbox, [540, 270, 740, 370]);
        assert_eq!(detections[0].class_id, 0);
        assert_eq!(detections[0].class_name.as_deref(), Some("carcaca"));
    }

    #[test]
    fn test_transposed_layout_gives_same_result() {
        let info = PreprocessInfo::from_dimensions(1280, 640, 640);
        let output = channels_first();
        let transposed = output.view().permuted_axes([0, 2, 1]).to_owned();
        assert_eq!(transposed.shape(), &[1, 3, 5]);

        let a = to_detections(
            &non_max_suppression(decode_predictions(output.view().into_dyn(), 1, 0.7).unwrap(), 0.7, 300),
            &info,
        );
        let b = to_detections(
            &non_max_suppression(
                decode_predictions(transposed.view().into_dyn(), 1, 0.7).unwrap(),
                0.7,
                300,
            ),
            &info,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_few_candidates_keep_channels_first_layout() {
        let output = channels_first();
        assert_eq!(output.shape(), &[1, 5, 3]);

        let candidates = decode_predictions(output.view().into_dyn(), 1, 0.7).unwrap();
        let boxes: Vec<(f32, f32, f32, f32)> =
            candidates.iter().map(|c| (c.x1, c.y1, c.x2, c.y2)).collect();
        assert_eq!(
            boxes,
            vec![(270.0, 295.0, 370.0, 345.0), (272.0, 296.0, 372.0, 346.0)]
        );
    }

    #[test]
    fn test_lower_threshold_keeps_more() {
        let output = channels_first();
        let candidates = decode_predictions(output.view().into_dyn(), 1, 0.25).unwrap();
        assert_eq!(candidates.len(), 3);

        let kept = non_max_suppression(candidates, 0.7, 300);
        assert_eq!(kept.len(), 2);
        assert!(kept[0].confidence >= kept[1].confidence);
    }

    #[test]
    fn test_max_detections_cap() {
        let output = channels_first();
        let candidates = decode_predictions(output.view().into_dyn(), 1, 0.25).unwrap();
        assert_eq!(non_max_suppression(candidates, 0.7, 1).len(), 1);
    }

    #[test]
    fn test_bad_output_shape_is_error() {
        let output = ndarray::Array4::<f32>::zeros((1, 1, 5, 3));
        assert!(decode_predictions(output.view().into_dyn(), 1, 0.7).is_err());
    }
}
