// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service settings
//!
//! Every field can be given as a command-line flag or through the environment
//! (a `.env` file in the working directory is honoured). Settings are built once
//! in `main` and shared read-only afterwards.

use clap::{ArgAction, Parser};
use std::fmt;
use std::path::PathBuf;

use crate::monitoring::{MonitorConfig, DEFAULT_SLOW_RESPONSE_MS};
use crate::vision::preprocessing::MIN_INPUT_SIZE;
use crate::vision::DetectorConfig;

pub const DEFAULT_PROJECT_NAME: &str = "Carcass Detection API";
pub const DEFAULT_API_V1_STR: &str = "/api/v1";
pub const DEFAULT_API_HOST: &str = "0.0.0.0";
pub const DEFAULT_API_PORT: u16 = 8000;
pub const DEFAULT_MODEL_PATH: &str = "models/best.onnx";
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.7;
pub const DEFAULT_MAX_DETECTIONS: usize = 300;
pub const DEFAULT_MODEL_INPUT_SIZE: u32 = 640;
pub const DEFAULT_INFERENCE_THREADS: usize = 4;

/// Carcass Detection API settings
#[derive(Parser, Clone)]
#[command(name = "carcass-detection-api")]
#[command(version)]
#[command(about = "Serve object detections for uploaded images", long_about = None)]
pub struct Settings {
    /// Name reported by `GET /`
    #[arg(long, env = "PROJECT_NAME", default_value = DEFAULT_PROJECT_NAME)]
    pub project_name: String,

    /// Prefix under which all routes are mounted a second time
    #[arg(long, env = "API_V1_STR", default_value = DEFAULT_API_V1_STR)]
    pub api_v1_str: String,

    /// Interface to bind
    #[arg(long, env = "API_HOST", default_value = DEFAULT_API_HOST)]
    pub api_host: String,

    /// Port to bind
    #[arg(long, env = "API_PORT", default_value_t = DEFAULT_API_PORT)]
    pub api_port: u16,

    /// Path to the ONNX detection model
    #[arg(long, env = "MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,

    /// Minimum score for a detection to be reported (0.0-1.0)
    #[arg(long, env = "CONFIDENCE_THRESHOLD", default_value_t = DEFAULT_CONFIDENCE_THRESHOLD, value_parser = parse_unit_interval)]
    pub confidence_threshold: f32,

    /// IoU above which overlapping boxes of the same class are suppressed (0.0-1.0)
    #[arg(long, env = "IOU_THRESHOLD", default_value_t = DEFAULT_IOU_THRESHOLD, value_parser = parse_unit_interval)]
    pub iou_threshold: f32,

    /// Maximum detections returned per image
    #[arg(long, env = "MAX_DETECTIONS", default_value_t = DEFAULT_MAX_DETECTIONS)]
    pub max_detections: usize,

    /// Square input size expected by the model
    #[arg(long, env = "MODEL_INPUT_SIZE", default_value_t = DEFAULT_MODEL_INPUT_SIZE, value_parser = clap::value_parser!(u32).range(MIN_INPUT_SIZE as i64..))]
    pub model_input_size: u32,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "INFERENCE_THREADS", default_value_t = DEFAULT_INFERENCE_THREADS)]
    pub inference_threads: usize,

    /// Responses slower than this are logged as warnings
    #[arg(long, env = "SLOW_RESPONSE_MS", default_value_t = DEFAULT_SLOW_RESPONSE_MS)]
    pub slow_response_ms: u64,

    /// Log a CPU/memory/disk snapshot after each request
    #[arg(long, env = "MONITOR_SYSTEM_METRICS", default_value_t = true, action = ArgAction::Set)]
    pub monitor_system_metrics: bool,

    /// Reserved for result storage, currently unused
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Reserved for result storage, currently unused
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub supabase_key: Option<String>,
}

fn parse_unit_interval(value: &str) -> Result<f32, String> {
    let parsed: f32 = value
        .parse()
        .map_err(|e| format!("'{}' is not a number: {}", value, e))?;
    if !(0.0..=1.0).contains(&parsed) {
        return Err(format!("{} is outside the range 0.0-1.0", parsed));
    }
    Ok(parsed)
}

impl Settings {
    /// Load settings from `.env`, the environment and the command line
    pub fn load() -> Result<Self, clap::Error> {
        dotenv::dotenv().ok();
        Self::try_parse()
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    /// Detector configuration derived from these settings
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            model_path: self.model_path.clone(),
            confidence_threshold: self.confidence_threshold,
            iou_threshold: self.iou_threshold,
            max_detections: self.max_detections,
            input_size: self.model_input_size,
            intra_threads: self.inference_threads,
        }
    }

    /// Endpoint monitoring configuration derived from these settings
    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            slow_response_ms: self.slow_response_ms,
            snapshot_system_metrics: self.monitor_system_metrics,
        }
    }

    /// Route prefix for the second mount, `None` when empty or `/`
    ///
    /// Always starts with `/` and never ends with one.
    pub fn api_prefix(&self) -> Option<String> {
        let prefix = self.api_v1_str.trim().trim_matches('/');
        if prefix.is_empty() {
            None
        } else {
            Some(format!("/{}", prefix))
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            api_v1_str: DEFAULT_API_V1_STR.to_string(),
            api_host: DEFAULT_API_HOST.to_string(),
            api_port: DEFAULT_API_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            max_detections: DEFAULT_MAX_DETECTIONS,
            model_input_size: DEFAULT_MODEL_INPUT_SIZE,
            inference_threads: DEFAULT_INFERENCE_THREADS,
            slow_response_ms: DEFAULT_SLOW_RESPONSE_MS,
            monitor_system_metrics: true,
            supabase_url: None,
            supabase_key: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("project_name", &self.project_name)
            .field("api_v1_str", &self.api_v1_str)
            .field("api_host", &self.api_host)
            .field("api_port", &self.api_port)
            .field("model_path", &self.model_path)
            .field("confidence_threshold", &self.confidence_threshold)
            .field("iou_threshold", &self.iou_threshold)
            .field("max_detections", &self.max_detections)
            .field("model_input_size", &self.model_input_size)
            .field("inference_threads", &self.inference_threads)
            .field("slow_response_ms", &self.slow_response_ms)
            .field("monitor_system_metrics", &self.monitor_system_metrics)
            .field("supabase_url", &self.supabase_url)
            .field(
                "supabase_key",
                &self.supabase_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
