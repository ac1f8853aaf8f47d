// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod integration_tests {
    use crate::config::{load_and_validate_config, RuntimeBuilder};
    use crate::engine::SlotState;

    /// The shipped demo catalog loads, validates and builds
    #[tokio::test]
    async fn test_workload_yaml_loading() {
        let config = load_and_validate_config("configs/workload.yaml").unwrap();

        assert_eq!(config.scheduler.max_concurrency, Some(4));
        assert_eq!(config.retry.failure_threshold, 3);
        assert_eq!(config.profiles.len(), 6);
        assert_eq!(config.profiles[0].name, "PM_38");
        assert_eq!(config.profiles[0].flow, "sleep");

        let scheduler = RuntimeBuilder::build_scheduler(&config).unwrap();
        let statuses = scheduler.statuses().unwrap();
        assert_eq!(statuses.len(), 6);

        let disabled = statuses.iter().find(|s| s.name == "SHM_07").unwrap();
        assert!(!disabled.enabled);
        assert_eq!(disabled.state, SlotState::Stopped);
        assert_eq!(disabled.schedule, "Runs at the following times: 02:00 on MONDAY");
    }

    /// TOML catalogs are equivalent to YAML ones
    #[tokio::test]
    async fn test_alerting_drill_toml_loading() {
        let config = load_and_validate_config("configs/alerting-drill.toml").unwrap();

        assert_eq!(config.scheduler.tick_ms, 500);
        assert_eq!(config.retry.failure_threshold, 2);
        assert_eq!(config.profiles.len(), 2);
        assert_eq!(config.profiles[1].flow, "fail");

        let (registry, settings) = RuntimeBuilder::from_config(&config).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(settings.max_concurrency, 2);
    }
}
