// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::detect::{detect_handler, MAX_UPLOAD_BODY_BYTES};
use super::errors::ApiError;
use super::middleware::{catch_panic, process_time_header};
use super::status::{health_handler, root_handler};
use crate::config::Settings;
use crate::monitoring::monitor_endpoint;
use crate::vision::ObjectDetector;

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub detector: Arc<dyn ObjectDetector>,
}

impl AppState {
    pub fn new(settings: Settings, detector: Arc<dyn ObjectDetector>) -> Self {
        Self {
            settings: Arc::new(settings),
            detector,
        }
    }
}

/// Build the application router
///
/// Routes are mounted at the root and again under the configured API prefix.
pub fn create_app(state: AppState) -> Router {
    let mut app = Router::new().merge(routes(&state));

    if let Some(prefix) = state.settings.api_prefix() {
        app = app.nest(&prefix, routes(&state));
    }

    // Outer guard covers the fallback; routes carry their own inside the monitor
    app.fallback(not_found)
        .layer(middleware::from_fn(catch_panic))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(middleware::from_fn(process_time_header))
        .with_state(state)
}

fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Service status
        .route("/", get(root_handler))
        // Model + system health
        .route("/health", get(health_handler))
        // Object detection
        .route(
            "/detect",
            post(detect_handler).layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_BYTES)),
        )
        // Panics become a 500 before the monitor records the request
        .route_layer(middleware::from_fn(catch_panic))
        .route_layer(middleware::from_fn_with_state(
            state.settings.monitor_config(),
            monitor_endpoint,
        ))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Serve the application until Ctrl-C
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.settings.bind_addr();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
