// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// src/monitoring/mod.rs - Main monitoring module

pub mod endpoint;
pub mod system;

// Re-export main types
pub use endpoint::{
    monitor_endpoint, record_endpoint_metrics, EndpointMetrics, EndpointStatus, MonitorConfig,
    DEFAULT_SLOW_RESPONSE_MS,
};

pub use system::{
    collect_system_metrics, log_system_metrics, sample_system_metrics, MetricsError,
    SystemMetrics,
};
