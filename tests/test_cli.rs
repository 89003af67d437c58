//! Contract tests for the headroom command line

use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn headroom() -> assert_cmd::Command {
    assert_cmd::cargo_bin_cmd!("headroom")
}

#[test]
fn test_help_lists_subcommands() {
    headroom()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("costs"))
        .stdout(predicate::str::contains("thresholds"))
        .stdout(predicate::str::contains("--profile"));
}

#[test]
fn test_version_includes_semantic_version() {
    headroom()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"headroom \d+\.\d+\.\d+ \(").unwrap());
}

#[test]
fn test_costs_json_lists_every_kind() {
    let output = headroom().args(["costs", "--json"]).output().unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 13);
    assert!(rows.iter().any(|r| r["kind"] == "ai-processing" && r["memory_intensive"] == true));
    assert!(rows.iter().any(|r| r["kind"] == "file-upload" && r["memory_intensive"] == false));
}

#[test]
fn test_thresholds_follow_profile_flag() {
    let output = headroom()
        .args(["thresholds", "--json", "--profile", "mobile"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["profile"], "mobile");
    assert_eq!(report["critical_cpu"], 90.0);
    assert_eq!(report["warning_memory"], 200 * 1024 * 1024);
}

#[test]
fn test_status_json_has_memory_and_cpu() {
    let output = headroom().args(["status", "--json"]).output().unwrap();
    assert!(output.status.success());

    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(status["memory"]["total"].as_u64().unwrap() > 0);
    assert!(status["cpu"]["cores"].as_u64().unwrap() >= 1);
    assert!(status["timestamp"].is_string());
}

#[test]
fn test_check_reports_memory_needed() {
    let output = headroom()
        .args(["check", "waveform", "10000000", "--json"])
        .output()
        .unwrap();
    // Verdict depends on this machine; only the exit code contract is fixed
    let code = output.status.code().unwrap();
    assert!(code == 0 || code == 2, "unexpected exit code {}", code);

    let check: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(check["estimated_memory_needed"], 60_000_000);
    assert_eq!(check["safe"], code == 0);
}

#[test]
fn test_check_impossible_operation_exits_unsafe() {
    headroom()
        .args(["check", "video-process", "1000000G"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("NOT SAFE"));
}

#[test]
fn test_check_unknown_kind_fails() {
    headroom()
        .args(["check", "hologram", "10MB"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown operation kind"));
}

#[test]
fn test_check_invalid_size_fails() {
    headroom()
        .args(["check", "waveform", "ten megabytes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid size"));
}

#[test]
fn test_watch_interval_out_of_range_fails() {
    headroom()
        .args(["watch", "--interval", "301"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid polling interval"));
}

#[test]
fn test_quiet_and_verbose_conflict() {
    headroom()
        .args(["--quiet", "--verbose", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used"));
}

#[test]
fn test_config_file_overrides_costs() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[costs.waveform]
memory_multiplier = 1.0
safety_factor = 1.0
min_memory_required = 1048576
preferred_memory = 2097152
description = "Server-assisted waveform"
"#,
    )
    .unwrap();

    let output = headroom()
        .args(["costs", "--json", "--config"])
        .arg(&config_path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let waveform = &rows.as_array().unwrap()[0];
    assert_eq!(waveform["description"], "Server-assisted waveform");
    assert_eq!(waveform["memory_intensive"], false);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("bad.toml");
    fs::write(&config_path, "[monitor]\npolling_interval = 0.05\n").unwrap();

    headroom()
        .args(["thresholds", "--config"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid polling interval"));
}

#[test]
fn test_missing_config_file_is_rejected() {
    headroom()
        .args(["costs", "--config", "/nonexistent/headroom.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_profile_flag_rechecks_configured_thresholds() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    // Fine for desktop, but above the development safe level of 500MB
    fs::write(
        &config_path,
        "[monitor]\nprofile = \"desktop\"\n\n[thresholds]\nwarning_memory = 629145600\n",
    )
    .unwrap();

    headroom()
        .args(["thresholds", "--json", "--profile", "development", "--config"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid thresholds"))
        .stderr(predicate::str::contains("development"));
}

#[test]
fn test_overrides_need_only_fit_selected_profile() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[thresholds]\nwarning_memory = 629145600\n").unwrap();

    let output = headroom()
        .args(["thresholds", "--json", "--profile", "desktop", "--config"])
        .arg(&config_path)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["profile"], "desktop");
    assert_eq!(report["warning_memory"], 629145600);
    assert_eq!(report["safe_memory"], 1024 * 1024 * 1024);
}
