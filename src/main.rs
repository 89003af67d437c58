#![forbid(unsafe_code)]

mod cli;

use anyhow::{Context, Result};
use cli::{CliCommand, CliConfig};
use headroom::constants::EXIT_UNSAFE;
use headroom::output::{self, ThresholdReport};
use headroom::{
    EnvironmentProfile, HeadroomConfig, HostProbe, MonitoringOptions, ResourceMonitor,
    ResourceThresholds,
};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = cli::parse_args()?;
    init_logging(&cli);

    let config = HeadroomConfig::load_or_default(cli.config_path.as_deref())
        .context("Failed to load configuration")?;
    let profile = cli
        .profile
        .unwrap_or_else(|| config.profile_or(EnvironmentProfile::from_host()));
    // Overrides only have to hold for the profile actually in use
    let thresholds = config
        .thresholds_for(profile)
        .with_context(|| format!("Configured thresholds do not fit the {} profile", profile))?;

    match cli.command {
        CliCommand::Status { json } => {
            let monitor = build_monitor(&config, profile, thresholds, config.cache_timeout())?;
            let status = monitor.get_status().await;
            if json {
                println!("{}", output::format_json(&*status)?);
            } else {
                println!("{}", output::format_status_human(&status));
            }
        }
        CliCommand::Check { kind, size, json } => {
            let monitor = build_monitor(&config, profile, thresholds, config.cache_timeout())?;
            let check = monitor.check_operation(kind, size).await;
            if json {
                println!("{}", output::format_json(&check)?);
            } else {
                println!("{}", output::format_check_human(kind, size, &check));
            }
            if !check.safe {
                return Ok(ExitCode::from(EXIT_UNSAFE));
            }
        }
        CliCommand::Watch { interval, json } => {
            let options = match interval {
                Some(seconds) => MonitoringOptions::from_secs_f64(seconds)?,
                None => MonitoringOptions::with_interval(config.polling_duration()),
            };
            watch(&cli, &config, profile, thresholds, options, json).await?;
        }
        CliCommand::Costs { json } => {
            let costs = config.cost_table()?;
            if json {
                println!("{}", output::format_json(&output::cost_rows(&costs))?);
            } else {
                println!("{}", output::format_costs_human(&costs));
            }
        }
        CliCommand::Thresholds { json } => {
            if json {
                println!("{}", output::format_json(&ThresholdReport { profile, thresholds })?);
            } else {
                println!("{}", output::format_thresholds_human(profile, &thresholds));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Send library log records to stderr. `-v` enables debug events, `-q`
/// keeps only errors, and `RUST_LOG` overrides both.
fn init_logging(cli: &CliConfig) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_monitor(
    config: &HeadroomConfig,
    profile: EnvironmentProfile,
    thresholds: ResourceThresholds,
    cache_timeout: Duration,
) -> Result<ResourceMonitor> {
    let mut probe = HostProbe::new(profile);
    if let Some(path) = &config.monitor.storage_path {
        probe = probe.with_storage_path(path.clone());
    }

    Ok(ResourceMonitor::builder(probe)
        .thresholds(thresholds)
        .costs(config.cost_table()?)
        .cache_timeout(cache_timeout)
        .storage_timeout(config.storage_timeout())
        .enable_caching(config.monitor.enable_caching)
        .build())
}

async fn watch(
    cli: &CliConfig,
    config: &HeadroomConfig,
    profile: EnvironmentProfile,
    thresholds: ResourceThresholds,
    options: MonitoringOptions,
    json: bool,
) -> Result<()> {
    let interval = options.effective_interval();
    // Every tick must see a fresh reading, so the cache expires within half an interval
    let monitor = build_monitor(config, profile, thresholds, config.cache_timeout().min(interval / 2))?;

    if !cli.quiet {
        eprintln!("Watching resources every {:.1}s (press Ctrl+C to stop)", interval.as_secs_f64());
    }

    monitor.start_monitoring(
        move |status| {
            let line = if json {
                output::format_json_line(&*status)
            } else {
                Ok(output::format_status_line(&status))
            };
            match line {
                Ok(line) => println!("{}", line),
                Err(e) => log::error!("Failed to format status: {}", e),
            }
        },
        options,
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    monitor.stop_monitoring();

    if !cli.quiet {
        eprintln!("Stopped watching");
    }
    Ok(())
}
