// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use workload_scheduler::config::{load_and_validate_config, RuntimeBuilder};
use workload_scheduler::errors::SchedulerError;
use workload_scheduler::flows::LocalFlowFactory;
use workload_scheduler::observability::messages::scheduler::SchedulerShutdownFailed;
use workload_scheduler::observability::messages::StructuredLog;

fn print_usage(program: &str) {
    eprintln!("Usage: {} <catalog.yaml|catalog.toml>", program);
    eprintln!("       {} --validate <catalog>", program);
    eprintln!("       {} --list-flows", program);
    eprintln!("Example: {} configs/workload.yaml", program);
    eprintln!("Set RUST_LOG (e.g. RUST_LOG=workload_scheduler=debug) to change verbosity.");
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("workload-scheduler");

    if let Err(error) = init_tracing() {
        eprintln!("❌ {:#}", error);
        return ExitCode::FAILURE;
    }

    let result = match args.get(1).map(String::as_str) {
        Some("--list-flows") => {
            for flow in LocalFlowFactory::list_available_flows() {
                println!("{}", flow);
            }
            Ok(())
        }
        Some("--validate") => match args.get(2) {
            Some(path) => validate(path),
            None => {
                print_usage(program);
                return ExitCode::FAILURE;
            }
        },
        Some(path) if !path.starts_with("--") => run(path).await,
        _ => {
            print_usage(program);
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("❌ {:#}", error);
            ExitCode::FAILURE
        }
    }
}

/// Load a catalog and resolve every flow without starting anything.
fn validate(path: &str) -> anyhow::Result<()> {
    let config = load_and_validate_config(path)
        .with_context(|| format!("catalog '{}' is invalid", path))?;
    let (registry, settings) = RuntimeBuilder::from_config(&config)
        .with_context(|| format!("catalog '{}' could not be built", path))?;

    println!("✅ {} is valid", path);
    println!(
        "   {} profiles, max concurrency {}",
        registry.len(),
        settings.max_concurrency
    );
    for descriptor in registry.list() {
        println!(
            "   • {} [{}] {}{}",
            descriptor.name(),
            descriptor.flow_selector().unwrap_or("custom"),
            descriptor.schedule_summary(),
            if descriptor.enabled() { "" } else { " (disabled)" }
        );
    }
    Ok(())
}

/// Run the catalog until Ctrl-C or a fatal scheduler error, then print the
/// final status of every profile as JSON.
async fn run(path: &str) -> anyhow::Result<()> {
    let config = load_and_validate_config(path)
        .with_context(|| format!("catalog '{}' is invalid", path))?;
    let scheduler = RuntimeBuilder::build_scheduler(&config)
        .with_context(|| format!("catalog '{}' could not be built", path))?;
    let grace = scheduler.config().shutdown_grace;

    scheduler.spawn()?;

    let fatal = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            None
        }
        joined = scheduler.join() => joined.err(),
    };

    if let Some(error) = fatal {
        // The loop has already exited; drain what is still running before reporting.
        if let Err(shutdown_error) = scheduler.shutdown(grace).await {
            SchedulerShutdownFailed {
                error: &shutdown_error,
            }
            .log();
        }
        return Err(error.into());
    }

    match scheduler.shutdown(grace).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report.statuses)?);
            Ok(())
        }
        Err(error @ SchedulerError::ShutdownTimedOut { .. }) => {
            println!("{}", serde_json::to_string_pretty(&scheduler.statuses()?)?);
            Err(error.into())
        }
        Err(error) => Err(error.into()),
    }
}
