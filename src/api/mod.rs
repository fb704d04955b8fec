// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod detect;
pub mod errors;
pub mod http_server;
pub mod middleware;
pub mod status;

pub use detect::{detect_handler, Upload, MAX_UPLOAD_BODY_BYTES, UPLOAD_FIELD};
pub use errors::{ApiError, ErrorResponse, UnhandledErrorResponse};
pub use http_server::{create_app, start_server, AppState};
pub use middleware::{catch_panic, process_time_header, PROCESS_TIME_HEADER};
pub use status::{health_handler, root_handler, HealthResponse, RootResponse};
