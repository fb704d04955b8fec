// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Carcass Detection API

/// Semantic version number
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the detection model family served by this build
pub const MODEL_VERSION: &str = "YOLOv8";

/// Get version information as a formatted string
pub fn get_version_string() -> String {
    format!("v{} ({} detector)", VERSION, MODEL_VERSION)
}
