// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 object detector backed by ONNX Runtime
//!
//! The detector is constructed once at startup, loaded once, and shared
//! read-only between request handlers behind `Arc<dyn ObjectDetector>`.

use anyhow::{anyhow, Context};
use image::DynamicImage;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use thiserror::Error;
use tracing::{debug, error, info};

use super::detection::{DetectionResult, ModelInfo, CLASS_NAMES};
use super::postprocess::{decode_predictions, non_max_suppression, to_detections};
use super::preprocessing::{preprocess_for_yolo, MIN_INPUT_SIZE, YOLO_INPUT_SIZE};
use crate::version::MODEL_VERSION;

/// Errors raised while loading or running the detection model
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("Model file not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("Failed to load model: {0:#}")]
    Load(anyhow::Error),

    #[error("Model not loaded")]
    NotLoaded,

    #[error("{0:#}")]
    Inference(anyhow::Error),
}

/// Seam between the HTTP layer and the inference backend
#[cfg_attr(test, mockall::automock)]
pub trait ObjectDetector: Send + Sync {
    /// Whether the model is available for inference
    fn is_loaded(&self) -> bool;

    /// Model details included in every result
    fn model_info(&self) -> ModelInfo;

    /// Run inference on a decoded image
    ///
    /// Only detections at or above the configured confidence threshold are
    /// returned. This call is CPU bound and blocks the calling thread.
    fn detect(&self, image: &DynamicImage) -> Result<DetectionResult, DetectorError>;
}

/// Configuration for the YOLOv8 detector
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub model_path: PathBuf,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub input_size: u32,
    pub intra_threads: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/best.onnx"),
            confidence_threshold: 0.7,
            iou_threshold: 0.7,
            max_detections: 300,
            input_size: YOLO_INPUT_SIZE,
            intra_threads: 4,
        }
    }
}

struct LoadedModel {
    /// ONNX Runtime session; runs are serialized through the lock
    session: Mutex<Session>,
    input_name: String,
}

/// YOLOv8 detector
pub struct YoloDetector {
    config: DetectorConfig,
    model: OnceLock<LoadedModel>,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("config", &self.config)
            .field("is_loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Create an unloaded detector; call [`YoloDetector::load`] before serving
    pub fn new(mut config: DetectorConfig) -> Self {
        config.confidence_threshold = config.confidence_threshold.clamp(0.0, 1.0);
        config.iou_threshold = config.iou_threshold.clamp(0.0, 1.0);
        config.input_size = config.input_size.max(MIN_INPUT_SIZE);
        Self {
            config,
            model: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Load the ONNX model from `model_path`
    ///
    /// Loading twice is a no-op.
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails or the file is not a valid model
    pub fn load(&self) -> Result<(), DetectorError> {
        if self.is_loaded() {
            return Ok(());
        }

        let model_path = &self.config.model_path;
        if !model_path.is_file() {
            error!("Detection model not found: {}", model_path.display());
            return Err(DetectorError::ModelNotFound(model_path.clone()));
        }

        info!("Loading detection model from {}", model_path.display());

        let loaded = self.build_session().map_err(|e| {
            error!("Failed to load detection model: {:#}", e);
            DetectorError::Load(e)
        })?;

        // A concurrent load may have won; either session is equivalent
        let _ = self.model.set(loaded);

        info!("✅ Detection model loaded: {}", model_path.display());
        Ok(())
    }

    fn build_session(&self) -> anyhow::Result<LoadedModel> {
        let model_path = &self.config.model_path;

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(self.config.intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load detection model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        if let Some(input) = session.inputs.first() {
            debug!("Detection model input {}: {:?}", input_name, input.input_type);
        }

        Ok(LoadedModel {
            session: Mutex::new(session),
            input_name,
        })
    }

    fn run_inference(
        &self,
        model: &LoadedModel,
        image: &DynamicImage,
    ) -> anyhow::Result<DetectionResult> {
        let (input, preprocess_info) = preprocess_for_yolo(image, self.config.input_size);

        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let mut session = model
            .session
            .lock()
            .map_err(|_| anyhow!("Detection session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![&model.input_name => input_value])
            .context("Detection inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        debug!("Detection output shape: {:?}", output_tensor.shape());

        let candidates = decode_predictions(
            output_tensor,
            CLASS_NAMES.len(),
            self.config.confidence_threshold,
        )?;
        let raw_count = candidates.len();
        let kept = non_max_suppression(
            candidates,
            self.config.iou_threshold,
            self.config.max_detections,
        );
        let detections = to_detections(&kept, &preprocess_info);

        debug!(
            "{} candidates above threshold, {} detections after NMS",
            raw_count,
            detections.len()
        );

        Ok(DetectionResult::new(detections, Some(self.model_info())))
    }
}

impl ObjectDetector for YoloDetector {
    fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            version: MODEL_VERSION.to_string(),
            confidence_threshold: self.config.confidence_threshold,
            model_path: self.config.model_path.display().to_string(),
        }
    }

    fn detect(&self, image: &DynamicImage) -> Result<DetectionResult, DetectorError> {
        let model = self.model.get().ok_or(DetectorError::NotLoaded)?;

        self.run_inference(model, image).map_err(|e| {
            error!("Detection failed: {:#}", e);
            DetectorError::Inference(e)
        })
    }
}
