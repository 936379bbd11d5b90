//! Integration tests for `hostattr config` and `hostattr hosts`.
//!
//! 빌드된 바이너리를 실제 설정/호스트 파일로 실행해 출력과 종료 코드를 확인합니다.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const HOSTS_EXAMPLE: &str = include_str!("../../hosts.toml.example");

fn hostattr(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hostattr"))
        .arg("-c")
        .arg(config)
        .arg("--log-level")
        .arg("error")
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("should spawn hostattr binary")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

/// 설정 파일과 예제 호스트 파일을 담은 임시 디렉토리
fn workspace(config: &str) -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
    let dir = TempDir::new().expect("should create temp dir");
    let config_path = dir.path().join("hostattr.toml");
    let hosts_path = dir.path().join("hosts.toml");
    fs::write(&config_path, config).expect("should write config");
    fs::write(&hosts_path, HOSTS_EXAMPLE).expect("should write hosts file");
    (dir, config_path, hosts_path)
}

#[test]
fn test_config_validate_valid_file() {
    let (_dir, config_path, _) = workspace("[general]\nlog_level = \"info\"\n");

    let output = hostattr(&config_path, &["--output", "json", "config", "validate"]);

    assert!(output.status.success(), "valid config should exit 0");
    let report = json_stdout(&output);
    assert_eq!(report["valid"].as_bool(), Some(true));
}

#[test]
fn test_config_validate_zero_capacity_exits_2() {
    let (_dir, config_path, _) = workspace("[host_attributes]\nmax_attribute_hosts = 0\n");

    let output = hostattr(&config_path, &["--output", "json", "config", "validate"]);

    assert_eq!(output.status.code(), Some(2));
    let report = json_stdout(&output);
    assert_eq!(report["valid"].as_bool(), Some(false));
    assert!(
        report["errors"][0]
            .as_str()
            .unwrap_or_default()
            .contains("max_attribute_hosts")
    );
}

#[test]
fn test_config_show_section() {
    let (_dir, config_path, _) = workspace("[host_attributes]\nmax_services_per_host = 3\n");

    let output = hostattr(
        &config_path,
        &["--output", "json", "config", "show", "--section", "host_attributes"],
    );

    assert!(output.status.success());
    let report = json_stdout(&output);
    assert_eq!(report["section"].as_str(), Some("host_attributes"));
    assert_eq!(report["config"]["max_services_per_host"].as_u64(), Some(3));
}

#[test]
fn test_hosts_check_example_file() {
    let (_dir, config_path, hosts_path) = workspace("");
    let hosts = hosts_path.to_str().expect("utf-8 path");

    let output = hostattr(&config_path, &["--output", "json", "hosts", "check", hosts]);

    assert!(output.status.success(), "example hosts file should load");
    let report = json_stdout(&output);
    assert_eq!(report["valid"].as_bool(), Some(true));
    assert_eq!(report["summary"]["hosts_added"].as_u64(), Some(3));
    assert_eq!(report["summary"]["services_added"].as_u64(), Some(4));

    let stats = report["stats"].as_array().expect("stats should be array");
    let total = stats
        .iter()
        .find(|peg| peg["name"] == "total_hosts")
        .expect("total_hosts peg");
    assert_eq!(total["value"].as_u64(), Some(3));
}

#[test]
fn test_hosts_check_uses_configured_file_and_capacity() {
    let dir = TempDir::new().expect("should create temp dir");
    let hosts_path = dir.path().join("hosts.toml");
    fs::write(&hosts_path, HOSTS_EXAMPLE).expect("should write hosts file");
    let config_path = dir.path().join("hostattr.toml");
    fs::write(
        &config_path,
        format!(
            "[host_attributes]\nmax_attribute_hosts = 2\nhosts_file = {:?}\n",
            hosts_path.display().to_string()
        ),
    )
    .expect("should write config");

    let output = hostattr(&config_path, &["--output", "json", "hosts", "check"]);

    assert!(output.status.success());
    let report = json_stdout(&output);
    let stats = report["stats"].as_array().expect("stats should be array");
    let value = |name: &str| {
        stats
            .iter()
            .find(|peg| peg["name"] == name)
            .and_then(|peg| peg["value"].as_u64())
    };
    assert_eq!(value("total_hosts"), Some(2));
    assert_eq!(value("hosts_pruned"), Some(1));
}

#[test]
fn test_hosts_check_rejected_file_exits_3() {
    let (dir, config_path, _) = workspace("");
    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "[[host]]\nip = \"10.0.0.1\"\n\n[[host]]\nip = \"10.0.0.999\"\n")
        .expect("should write bad hosts file");

    let output = hostattr(
        &config_path,
        &["--output", "json", "hosts", "check", bad.to_str().expect("utf-8 path")],
    );

    assert_eq!(output.status.code(), Some(3));
    let report = json_stdout(&output);
    assert_eq!(report["valid"].as_bool(), Some(false));
    assert!(
        report["errors"][0]
            .as_str()
            .unwrap_or_default()
            .contains("#1")
    );
}

#[test]
fn test_hosts_check_without_file_exits_2() {
    let (_dir, config_path, _) = workspace("");

    let output = hostattr(&config_path, &["hosts", "check"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("hosts_file"));
}

#[test]
fn test_hosts_lookup_found_and_missing() {
    let (_dir, config_path, hosts_path) = workspace("");
    let hosts = hosts_path.to_str().expect("utf-8 path");

    let found = hostattr(
        &config_path,
        &["--output", "json", "hosts", "lookup", "--file", hosts, "192.168.1.20"],
    );
    assert!(found.status.success());
    let report = json_stdout(&found);
    assert_eq!(report["host"]["stream_policy"].as_str(), Some("win-2003"));
    assert_eq!(report["host"]["services"][0]["protocol"].as_str(), Some("dns"));
    assert_eq!(report["host"]["services"][0]["ip_proto"].as_str(), Some("udp"));

    let missing = hostattr(
        &config_path,
        &["--output", "json", "hosts", "lookup", "--file", hosts, "10.10.10.10"],
    );
    assert_eq!(missing.status.code(), Some(1));
    assert!(json_stdout(&missing)["host"].is_null());
}

#[test]
fn test_hosts_dump_text_output() {
    let (_dir, config_path, hosts_path) = workspace("");

    let output = hostattr(
        &config_path,
        &["hosts", "dump", hosts_path.to_str().expect("utf-8 path")],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("192.168.1.10"));
    assert!(stdout.contains("2001:db8::1"));
    assert!(stdout.contains("tcp/443=ssl"));
}

#[test]
fn test_hosts_check_prints_prometheus_metrics() {
    let (_dir, config_path, hosts_path) = workspace("");

    let output = hostattr(
        &config_path,
        &["hosts", "check", "--metrics", hosts_path.to_str().expect("utf-8 path")],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# HELP hostattr_total_hosts"));
    assert!(stdout.contains("hostattr_total_hosts 3"));
    assert!(stdout.contains("hostattr_loads_total{result=\"success\"} 1"));
    assert!(stdout.contains("hostattr_active_generation 1"));
}
