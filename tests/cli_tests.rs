//! Integration tests for the command-line binaries.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("platform.toml");
    fs::write(&path, body).unwrap();
    path
}

fn sim_config(dir: &Path) -> (PathBuf, PathBuf) {
    let trace = dir.join("run.vcd");
    let config = write_config(
        dir,
        &format!("[simulation]\nreset_hold = 2\ntrace_path = '{}'\n", trace.display()),
    );
    (config, trace)
}

fn reactor_sim(config: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_reactor-sim"))
        .arg("--config")
        .arg(config)
        .args(extra)
        .output()
        .unwrap()
}

fn reactor_host(extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_reactor-host"))
        .args(extra)
        .output()
        .unwrap()
}

/// Tests that a rejected step budget leaves no trace file behind.
#[test]
fn test_sim_bad_budget_creates_no_trace() {
    let dir = tempfile::tempdir().unwrap();
    let (config, trace) = sim_config(dir.path());

    let out = reactor_sim(&config, &["--trace", "--timeout", "2"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(!trace.exists());
}

/// Tests that a valid budget run writes the trace and exits cleanly.
#[test]
fn test_sim_budget_run_writes_trace() {
    let dir = tempfile::tempdir().unwrap();
    let (config, trace) = sim_config(dir.path());

    let out = reactor_sim(&config, &["--trace", "--timeout", "10"]);
    assert_eq!(out.status.code(), Some(0));
    let text = fs::read_to_string(&trace).unwrap();
    assert!(text.contains("$enddefinitions"));
}

/// Tests that an invalid configuration is reported as an initialization failure.
#[cfg(unix)]
#[test]
fn test_host_bad_config_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "[platform]\nalignment = 48\n");

    let out = reactor_host(&["--config", config.to_str().unwrap()]);
    // exit(-2) is reported as 254 on unix.
    assert_eq!(out.status.code(), Some(254));
}

/// Tests that the vadd host scenario passes with the default configuration.
#[test]
fn test_host_vadd_passes() {
    let out = reactor_host(&["--reactor", "vadd"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
}
