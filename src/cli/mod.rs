//! CLI argument parsing and validation module
//!
//! Handles command-line interface using clap, including:
//! - Global profile, config file and verbosity options
//! - The status, check, watch, costs and thresholds subcommands
//! - Size parsing with binary-unit suffixes
//! - Output format selection (human/JSON)

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use headroom::constants::{GB, KB, MB};
use headroom::models::{EnvironmentProfile, MonitorError, OperationKind};
use headroom::monitor::polling::validate_interval;
use std::ffi::OsString;
use std::path::PathBuf;

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Overrides config file and host detection
    pub profile: Option<EnvironmentProfile>,
    pub config_path: Option<PathBuf>,
    pub quiet: bool,
    pub verbose: bool,
    pub command: CliCommand,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Status { json: bool },
    Check { kind: OperationKind, size: u64, json: bool },
    /// `interval` is in seconds; `None` uses the configured interval
    Watch { interval: Option<f64>, json: bool },
    Costs { json: bool },
    Thresholds { json: bool },
}

fn json_arg() -> Arg {
    Arg::new("json")
        .short('j')
        .long("json")
        .help("Output in JSON format")
        .action(ArgAction::SetTrue)
}

/// Build the clap command tree
pub fn build_command() -> Command {
    Command::new("headroom")
        .version(version_string())
        .about("Check whether a resource-intensive operation is safe to run")
        .long_about(
            "Samples free memory, CPU load and storage, and compares them against \
             per-operation memory costs to decide whether an operation can run now.",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("profile")
                .long("profile")
                .value_name("PROFILE")
                .help("Threshold profile: mobile, desktop or development (default: detected)")
                .global(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a TOML configuration file")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print debug logs to stderr")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet")
                .global(true),
        )
        .subcommand(
            Command::new("status")
                .about("Show current memory, CPU and storage")
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Check whether an operation over SIZE bytes is safe to run")
                .arg(
                    Arg::new("kind")
                        .value_name("KIND")
                        .help("Operation kind, e.g. waveform, video-process, file-upload")
                        .required(true),
                )
                .arg(
                    Arg::new("size")
                        .value_name("SIZE")
                        .help("Input size in bytes, or with a suffix such as 512K, 10MB, 2G")
                        .required(true),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("watch")
                .about("Print a status snapshot every interval until interrupted")
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("SECONDS")
                        .help("Seconds between snapshots (0.1 - 300.0)")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("costs")
                .about("List the memory cost of every operation kind")
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("thresholds")
                .about("Show the active resource thresholds")
                .arg(json_arg()),
        )
}

/// Parse process arguments
pub fn parse_args() -> Result<CliConfig> {
    parse_from(std::env::args_os())
}

/// Parse an explicit argument list. Help and version requests exit the process.
pub fn parse_from<I, T>(args: I) -> Result<CliConfig>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command().get_matches_from(args);
    from_matches(&matches)
}

fn from_matches(matches: &ArgMatches) -> Result<CliConfig> {
    let profile = matches
        .get_one::<String>("profile")
        .map(|p| p.parse::<EnvironmentProfile>())
        .transpose()?;

    let command = match matches.subcommand() {
        Some(("status", sub)) => CliCommand::Status { json: sub.get_flag("json") },
        Some(("check", sub)) => {
            let kind_arg = sub.get_one::<String>("kind").map(String::as_str).unwrap_or_default();
            let size_arg = sub.get_one::<String>("size").map(String::as_str).unwrap_or_default();
            CliCommand::Check {
                kind: kind_arg.parse()?,
                size: parse_size(size_arg)?,
                json: sub.get_flag("json"),
            }
        }
        Some(("watch", sub)) => {
            let interval = sub.get_one::<f64>("interval").copied();
            if let Some(seconds) = interval {
                validate_interval(seconds)?;
            }
            CliCommand::Watch { interval, json: sub.get_flag("json") }
        }
        Some(("costs", sub)) => CliCommand::Costs { json: sub.get_flag("json") },
        Some(("thresholds", sub)) => CliCommand::Thresholds { json: sub.get_flag("json") },
        _ => anyhow::bail!("No command given. Run 'headroom --help' for usage."),
    };

    Ok(CliConfig {
        profile,
        config_path: matches.get_one::<PathBuf>("config").cloned(),
        quiet: matches.get_flag("quiet"),
        verbose: matches.get_flag("verbose"),
        command,
    })
}

/// Parse a size such as `1048576`, `512K`, `10MB`, `1.5GiB`
pub fn parse_size(input: &str) -> Result<u64, MonitorError> {
    let invalid = || MonitorError::InvalidSize(input.to_string());
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => KB,
        "m" | "mb" | "mib" => MB,
        "g" | "gb" | "gib" => GB,
        _ => return Err(invalid()),
    };

    if let Ok(whole) = number.parse::<u64>() {
        return whole.checked_mul(multiplier).ok_or_else(invalid);
    }

    let value: f64 = number.parse().map_err(|_| invalid())?;
    let bytes = (value * multiplier as f64).round();
    if !bytes.is_finite() || bytes < 0.0 || bytes >= u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(bytes as u64)
}

/// Version string including the git hash injected at build time
pub fn version_string() -> &'static str {
    concat!(env!("HEADROOM_VERSION"), " (", env!("GIT_HASH"), ")")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_units() {
        assert_eq!(parse_size("1048576").unwrap(), MB);
        assert_eq!(parse_size("512K").unwrap(), 512 * KB);
        assert_eq!(parse_size("10MB").unwrap(), 10 * MB);
        assert_eq!(parse_size("2g").unwrap(), 2 * GB);
        assert_eq!(parse_size("1.5GiB").unwrap(), GB + GB / 2);
        assert_eq!(parse_size(" 3 mb ").unwrap(), 3 * MB);
    }

    #[test]
    fn test_parse_size_rejects_garbage() {
        for input in ["", "MB", "ten", "10TB", "-5", "1.2.3M"] {
            assert!(
                matches!(parse_size(input), Err(MonitorError::InvalidSize(_))),
                "accepted {:?}",
                input
            );
        }
    }

    #[test]
    fn test_parse_size_overflow_is_an_error() {
        assert!(parse_size("18446744073709551615G").is_err());
    }

    #[test]
    fn test_check_command() {
        let config = parse_from(["headroom", "check", "video_process", "20MB", "--json"]).unwrap();
        assert_eq!(
            config.command,
            CliCommand::Check { kind: OperationKind::VideoProcess, size: 20 * MB, json: true }
        );
        assert_eq!(config.profile, None);
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let config = parse_from(["headroom", "status", "--profile", "mobile", "-q"]).unwrap();
        assert_eq!(config.profile, Some(EnvironmentProfile::Mobile));
        assert!(config.quiet);
    }

    #[test]
    fn test_unknown_kind_is_an_error() {
        let err = parse_from(["headroom", "check", "hologram", "1M"]).unwrap_err();
        assert!(err.to_string().contains("hologram"));
    }

    #[test]
    fn test_watch_interval_is_validated() {
        assert!(parse_from(["headroom", "watch", "--interval", "0.05"]).is_err());
        let config = parse_from(["headroom", "watch", "-i", "2.5"]).unwrap();
        assert_eq!(config.command, CliCommand::Watch { interval: Some(2.5), json: false });
    }

    #[test]
    fn test_command_definition_is_consistent() {
        build_command().debug_assert();
    }
}
