// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// src/monitoring/system.rs - System resource snapshots

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use sysinfo::{Disks, System, MINIMUM_CPU_UPDATE_INTERVAL};
use thiserror::Error;
use tracing::{error, info};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Memory information unavailable")]
    MemoryUnavailable,

    #[error("No disks reported by the system")]
    NoDisk,

    #[error("Metrics collection task failed: {0}")]
    Task(String),
}

/// Point-in-time resource usage of the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub timestamp: String,
    pub cpu_percent: f32,
    pub memory_percent: f64,
    pub memory_used_mb: f64,
    pub disk_percent: f64,
    pub disk_free_gb: f64,
}

/// Usage of one filesystem in bytes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskUsage {
    pub total: u64,
    pub available: u64,
}

impl DiskUsage {
    pub fn used_percent(&self) -> f64 {
        percent(self.total.saturating_sub(self.available), self.total)
    }

    pub fn free_gb(&self) -> f64 {
        self.available as f64 / BYTES_PER_GB
    }
}

fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    used as f64 / total as f64 * 100.0
}

/// Pick the filesystem holding `/`, or the largest one when `/` is not mounted
pub fn select_disk<'a, I>(disks: I) -> Option<DiskUsage>
where
    I: IntoIterator<Item = (&'a Path, DiskUsage)>,
{
    let mut largest: Option<DiskUsage> = None;
    for (mount_point, usage) in disks {
        if mount_point == Path::new("/") {
            return Some(usage);
        }
        if largest.map_or(true, |l| usage.total > l.total) {
            largest = Some(usage);
        }
    }
    largest
}

/// Sample CPU, memory and disk usage
///
/// Blocks for `sysinfo::MINIMUM_CPU_UPDATE_INTERVAL` so CPU usage is
/// measured over a real interval.
pub fn collect_system_metrics() -> Result<SystemMetrics, MetricsError> {
    let mut sys = System::new();
    sys.refresh_cpu();
    std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
    sys.refresh_cpu();
    sys.refresh_memory();

    let total_memory = sys.total_memory();
    if total_memory == 0 {
        return Err(MetricsError::MemoryUnavailable);
    }
    let used_memory = sys.used_memory();

    let disks = Disks::new_with_refreshed_list();
    let disk = select_disk(disks.list().iter().map(|d| {
        (
            d.mount_point(),
            DiskUsage {
                total: d.total_space(),
                available: d.available_space(),
            },
        )
    }))
    .ok_or(MetricsError::NoDisk)?;

    Ok(SystemMetrics {
        timestamp: Utc::now().to_rfc3339(),
        cpu_percent: sys.global_cpu_info().cpu_usage(),
        memory_percent: percent(used_memory, total_memory),
        memory_used_mb: used_memory as f64 / BYTES_PER_MB,
        disk_percent: disk.used_percent(),
        disk_free_gb: disk.free_gb(),
    })
}

/// Collect system metrics on the blocking pool
pub async fn sample_system_metrics() -> Result<SystemMetrics, MetricsError> {
    tokio::task::spawn_blocking(collect_system_metrics)
        .await
        .map_err(|e| MetricsError::Task(e.to_string()))?
}

/// Collect and log a snapshot; failures are logged and swallowed
pub fn log_system_metrics() -> Option<SystemMetrics> {
    match collect_system_metrics() {
        Ok(metrics) => {
            info!(
                "System metrics: {}",
                serde_json::to_string(&metrics).unwrap_or_default()
            );
            Some(metrics)
        }
        Err(e) => {
            error!("Error collecting system metrics: {}", e);
            None
        }
    }
}
