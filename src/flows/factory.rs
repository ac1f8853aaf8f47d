// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use super::{FailFlow, NoopFlow, ShellFlow, SleepFlow};
use crate::config::ProfileConfig;
use crate::errors::FlowFactoryError;
use crate::traits::{Flow, FlowFactory};

const DEFAULT_FAIL_MESSAGE: &str = "simulated flow failure";

/// Resolves catalog flow selectors to built-in flow factories.
pub struct LocalFlowFactory;

impl LocalFlowFactory {
    /// Build the flow factory for one catalog entry
    ///
    /// The `flow` field selects the implementation:
    /// - "noop" -> NoopFlow
    /// - "sleep" -> SleepFlow (requires `duration_ms`)
    /// - "shell" -> ShellFlow (requires `command`, optional `args`)
    /// - "fail" -> FailFlow (optional `message`)
    ///
    /// Options are parsed once here; every run gets a fresh flow built from
    /// the parsed values.
    pub fn create_factory(config: &ProfileConfig) -> Result<FlowFactory, FlowFactoryError> {
        match config.flow.as_str() {
            "noop" => Ok(FlowFactory::new(|| Box::new(NoopFlow::new()) as Box<dyn Flow>)),

            "sleep" => {
                let duration = Duration::from_millis(required_u64(config, "duration_ms")?);
                Ok(FlowFactory::new(move || {
                    Box::new(SleepFlow::new(duration)) as Box<dyn Flow>
                }))
            }

            "shell" => {
                let command = required_str(config, "command")?;
                let args = optional_str_list(config, "args")?;
                Ok(FlowFactory::new(move || {
                    Box::new(ShellFlow::new(command.clone(), args.clone())) as Box<dyn Flow>
                }))
            }

            "fail" => {
                let message = optional_str(config, "message")?
                    .unwrap_or_else(|| DEFAULT_FAIL_MESSAGE.to_string());
                Ok(FlowFactory::new(move || {
                    Box::new(FailFlow::new(message.clone())) as Box<dyn Flow>
                }))
            }

            other => Err(FlowFactoryError::UnknownFlow {
                profile_name: config.name.clone(),
                flow: other.to_string(),
            }),
        }
    }

    /// List all built-in flow selectors
    pub fn list_available_flows() -> Vec<&'static str> {
        vec!["noop", "sleep", "shell", "fail"]
    }

    pub fn is_flow_available(flow: &str) -> bool {
        Self::list_available_flows().contains(&flow)
    }
}

fn invalid(config: &ProfileConfig, reason: String) -> FlowFactoryError {
    FlowFactoryError::InvalidOptions {
        profile_name: config.name.clone(),
        flow: config.flow.clone(),
        reason,
    }
}

fn required_u64(config: &ProfileConfig, key: &str) -> Result<u64, FlowFactoryError> {
    match config.options.get(key) {
        Some(value) => value
            .as_u64()
            .ok_or_else(|| invalid(config, format!("'{}' must be a non-negative integer", key))),
        None => Err(invalid(config, format!("missing required option '{}'", key))),
    }
}

fn optional_str(config: &ProfileConfig, key: &str) -> Result<Option<String>, FlowFactoryError> {
    match config.options.get(key) {
        Some(value) => value
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| invalid(config, format!("'{}' must be a string", key))),
        None => Ok(None),
    }
}

fn required_str(config: &ProfileConfig, key: &str) -> Result<String, FlowFactoryError> {
    optional_str(config, key)?
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| invalid(config, format!("missing required option '{}'", key)))
}

fn optional_str_list(config: &ProfileConfig, key: &str) -> Result<Vec<String>, FlowFactoryError> {
    let Some(value) = config.options.get(key) else {
        return Ok(Vec::new());
    };
    let items = value
        .as_sequence()
        .ok_or_else(|| invalid(config, format!("'{}' must be a list of strings", key)))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(config, format!("'{}' must be a list of strings", key)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn create_test_config(flow: &str, options: &str) -> ProfileConfig {
        let options: HashMap<String, serde_yaml::Value> = if options.is_empty() {
            HashMap::new()
        } else {
            serde_yaml::from_str(options).unwrap()
        };
        ProfileConfig {
            name: "PM_38".to_string(),
            flow: flow.to_string(),
            interval_seconds: Some(60),
            scheduled_times: Vec::new(),
            scheduled_days: Vec::new(),
            enabled: true,
            start_delay_seconds: 0,
            max_iterations: None,
            timeout_seconds: None,
            options,
        }
    }

    #[tokio::test]
    async fn test_create_noop_and_fail_flows() {
        let noop = LocalFlowFactory::create_factory(&create_test_config("noop", "")).unwrap();
        assert_eq!(noop.build().name(), "noop");
        assert!(noop.build().execute().await.is_ok());

        let fail = LocalFlowFactory::create_factory(&create_test_config("fail", "message: NE down"))
            .unwrap();
        let error = fail.build().execute().await.unwrap_err();
        assert_eq!(error.to_string(), "NE down");

        let default_fail = LocalFlowFactory::create_factory(&create_test_config("fail", "")).unwrap();
        let error = default_fail.build().execute().await.unwrap_err();
        assert_eq!(error.to_string(), DEFAULT_FAIL_MESSAGE);
    }

    #[test]
    fn test_create_sleep_requires_duration() {
        let factory =
            LocalFlowFactory::create_factory(&create_test_config("sleep", "duration_ms: 250"));
        assert_eq!(factory.unwrap().build().name(), "sleep");

        let error = LocalFlowFactory::create_factory(&create_test_config("sleep", "")).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid options for 'sleep' flow in profile 'PM_38': missing required option 'duration_ms'"
        );

        let error =
            LocalFlowFactory::create_factory(&create_test_config("sleep", "duration_ms: soon"))
                .unwrap_err();
        assert!(error.to_string().contains("must be a non-negative integer"));
    }

    #[test]
    fn test_create_shell_validates_args() {
        let ok = LocalFlowFactory::create_factory(&create_test_config(
            "shell",
            "{command: ping, args: ['-c', '1', 'ne-01']}",
        ));
        assert_eq!(ok.unwrap().build().name(), "shell");

        let missing = LocalFlowFactory::create_factory(&create_test_config("shell", "args: []"));
        assert!(missing.is_err());

        let bad_args = LocalFlowFactory::create_factory(&create_test_config(
            "shell",
            "{command: ping, args: 3}",
        ));
        assert!(bad_args
            .unwrap_err()
            .to_string()
            .contains("'args' must be a list of strings"));
    }

    #[test]
    fn test_create_unknown_flow() {
        let error =
            LocalFlowFactory::create_factory(&create_test_config("netconf", "")).unwrap_err();
        assert_eq!(
            error,
            FlowFactoryError::UnknownFlow {
                profile_name: "PM_38".to_string(),
                flow: "netconf".to_string(),
            }
        );
    }

    #[test]
    fn test_list_available_flows() {
        let flows = LocalFlowFactory::list_available_flows();
        assert_eq!(flows, vec!["noop", "sleep", "shell", "fail"]);
        assert!(LocalFlowFactory::is_flow_available("shell"));
        assert!(!LocalFlowFactory::is_flow_available("netconf"));
    }
}
