// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use carcass_detection_api::{
    api::{start_server, AppState},
    config::Settings,
    version,
    vision::YoloDetector,
};
use std::{env, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    // --help / --version and invalid values exit here
    let settings = Settings::load().unwrap_or_else(|e| e.exit());

    info!("Starting {} ({})", settings.project_name, version::get_version_string());
    info!("Settings: {:?}", settings);

    // Model must be available before the server accepts requests
    let detector = YoloDetector::new(settings.detector_config());
    detector.load().with_context(|| {
        format!(
            "Failed to load detection model from {}",
            settings.model_path.display()
        )
    })?;
    info!("Detection model ready");

    let state = AppState::new(settings, Arc::new(detector));
    start_server(state).await
}
