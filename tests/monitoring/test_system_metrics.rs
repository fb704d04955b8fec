// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! System metrics collection tests
//!
//! Collection reads live host data, so value checks only run when the host
//! exposes memory and disk information.

use carcass_detection_api::monitoring::{
    collect_system_metrics, log_system_metrics, sample_system_metrics,
};

#[cfg(test)]
mod collection_tests {
    use super::*;

    #[test]
    fn test_collected_values_in_range() {
        let metrics = match collect_system_metrics() {
            Ok(metrics) => metrics,
            Err(e) => {
                eprintln!("Skipping: {}", e);
                return;
            }
        };

        assert!((0.0..=100.0).contains(&metrics.cpu_percent));
        assert!((0.0..=100.0).contains(&metrics.memory_percent));
        assert!((0.0..=100.0).contains(&metrics.disk_percent));
        assert!(metrics.memory_used_mb >= 0.0);
        assert!(metrics.disk_free_gb >= 0.0);
        assert!(chrono::DateTime::parse_from_rfc3339(&metrics.timestamp).is_ok());
    }

    #[test]
    fn test_log_matches_collect() {
        let direct = collect_system_metrics().is_ok();
        assert_eq!(log_system_metrics().is_some(), direct);
    }

    #[tokio::test]
    async fn test_sample_on_blocking_pool() {
        let direct = collect_system_metrics().is_ok();
        assert_eq!(sample_system_metrics().await.is_ok(), direct);
    }
}
