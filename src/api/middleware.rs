// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cross-cutting request middleware

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::error;

use super::errors::UnhandledErrorResponse;

/// Response header carrying the handling time in seconds
pub const PROCESS_TIME_HEADER: &str = "x-process-time";

/// Set `X-Process-Time` on every response
pub async fn process_time_header(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let mut response = next.run(request).await;
    let elapsed = start.elapsed().as_secs_f64();

    if let Ok(value) = HeaderValue::from_str(&elapsed.to_string()) {
        response.headers_mut().insert(PROCESS_TIME_HEADER, value);
    }
    response
}

/// Turn a panicking handler into the generic 500 body instead of dropping
/// the connection
pub async fn catch_panic(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            error!(
                "Unhandled error on {}: {}",
                path,
                panic_message(panic.as_ref())
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(UnhandledErrorResponse::new(path)),
            )
                .into_response()
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
