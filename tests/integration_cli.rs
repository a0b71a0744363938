//! Drives the compiled binary over the miniature scenario.

mod common;

use std::fs;
use std::io::Write;
use std::process::{Command, Output, Stdio};

use common::Scenario;

fn binary() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_logistic-load"));
    cmd.env("RUST_LOG", "warn");
    cmd
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn serial_run_writes_columns_and_json_report() {
    let scenario = Scenario::standard("cli-serial");
    let report_path = scenario.path().join("report.json");

    let output = binary()
        .arg("--scenario")
        .arg(scenario.path())
        .arg("--serial")
        .arg("--report-out")
        .arg(&report_path)
        .output()
        .expect("binary should start");
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("4 ok, 0 failed"), "stdout: {stdout}");

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).expect("report written"))
            .expect("valid JSON");
    assert_eq!(report["mode"], "sequential");
    assert_eq!(report["buildings"].as_array().map(Vec::len), Some(4));

    let (headers, _) = common::parse_demand(&scenario.read_demand("B001"));
    assert!(headers.iter().any(|h| h == "truck_diesel"));
}

#[test]
fn failed_building_sets_nonzero_exit() {
    let scenario = Scenario::standard("cli-failure");
    scenario.remove_demand("B002");

    let output = binary()
        .args(["--workers", "2", "--scenario"])
        .arg(scenario.path())
        .output()
        .expect("binary should start");
    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("3 ok, 1 failed"), "stdout: {stdout}");
    assert!(stdout.contains("FAILED  [Io]"), "stdout: {stdout}");
}

#[test]
fn prompts_for_scenario_when_not_given() {
    let scenario = Scenario::standard("cli-prompt");

    let mut child = binary()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("binary should start");
    {
        let stdin = child.stdin.as_mut().expect("piped stdin");
        writeln!(stdin, "{}", scenario.path().display()).expect("write scenario path");
        writeln!(stdin, "n").expect("write parallel answer");
    }
    let output = child.wait_with_output().expect("binary should finish");
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Dispatch:   sequential"), "stdout: {stdout}");
}

#[test]
fn unclear_parallel_answer_stops_before_running() {
    let scenario = Scenario::standard("cli-prompt-answer");
    let before = scenario.read_demand("B001");

    let mut child = binary()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("binary should start");
    {
        let stdin = child.stdin.as_mut().expect("piped stdin");
        writeln!(stdin, "{}", scenario.path().display()).expect("write scenario path");
        writeln!(stdin, "maybe").expect("write parallel answer");
    }
    let output = child.wait_with_output().expect("binary should finish");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("expected y or n"), "stderr: {}", stderr(&output));
    assert_eq!(scenario.read_demand("B001"), before);
}

#[test]
fn invalid_config_is_rejected_before_running() {
    let scenario = Scenario::standard("cli-config");
    let config_path = scenario.path().join("logistics.toml");
    fs::write(&config_path, "[forklift]\nbattery_voltage_v = 0.0\n").expect("write config");
    let before = scenario.read_demand("B001");

    let output = binary()
        .arg("--scenario")
        .arg(scenario.path())
        .arg("--config")
        .arg(&config_path)
        .output()
        .expect("binary should start");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("forklift.battery_voltage_v"));
    assert_eq!(scenario.read_demand("B001"), before);
}

#[test]
fn unknown_argument_prints_usage() {
    let output = binary().arg("--seed").output().expect("binary should start");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unknown argument: --seed"));
    assert!(stderr(&output).contains("Usage: logistic-load"));
}
