// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Detector loading tests
//!
//! No real model is needed: these cover the failure paths a service hits at
//! startup and the behaviour of an unloaded detector.

use carcass_detection_api::config::Settings;
use carcass_detection_api::vision::{DetectorError, ObjectDetector, YoloDetector};
use image::{DynamicImage, RgbImage};
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

fn detector_for(path: PathBuf) -> YoloDetector {
    let settings = Settings {
        model_path: path,
        ..Settings::default()
    };
    YoloDetector::new(settings.detector_config())
}

#[cfg(test)]
mod loading_tests {
    use super::*;

    #[test]
    fn test_missing_model_file() {
        let dir = TempDir::new().unwrap();
        let detector = detector_for(dir.path().join("best.onnx"));

        let err = detector.load().unwrap_err();
        assert!(matches!(err, DetectorError::ModelNotFound(_)));
        assert!(err.to_string().contains("best.onnx"));
        assert!(!detector.is_loaded());
    }

    #[test]
    fn test_directory_is_not_a_model() {
        let dir = TempDir::new().unwrap();
        let detector = detector_for(dir.path().to_path_buf());

        assert!(matches!(
            detector.load(),
            Err(DetectorError::ModelNotFound(_))
        ));
    }

    #[test]
    fn test_corrupt_model_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"definitely not an onnx graph").unwrap();
        let detector = detector_for(file.path().to_path_buf());

        let err = detector.load().unwrap_err();
        assert!(matches!(err, DetectorError::Load(_)));
        assert!(err.to_string().starts_with("Failed to load model"));
        assert!(!detector.is_loaded());
    }

    #[test]
    fn test_detect_before_load() {
        let detector = detector_for(PathBuf::from("models/missing.onnx"));
        let image = DynamicImage::ImageRgb8(RgbImage::new(32, 32));

        assert!(matches!(
            detector.detect(&image),
            Err(DetectorError::NotLoaded)
        ));
    }

    #[test]
    fn test_model_info_reflects_settings() {
        let settings = Settings {
            model_path: PathBuf::from("weights/carcass.onnx"),
            confidence_threshold: 0.55,
            ..Settings::default()
        };
        let detector = YoloDetector::new(settings.detector_config());
        let info = detector.model_info();

        assert_eq!(info.version, "YOLOv8");
        assert_eq!(info.confidence_threshold, 0.55);
        assert_eq!(info.model_path, "weights/carcass.onnx");
    }
}
