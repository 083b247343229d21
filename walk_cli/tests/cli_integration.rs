use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::{TempDir, tempdir};

// Degrees of latitude per meter on the mean-radius sphere
const DEG_PER_M: f64 = 1.0 / 111_194.93;

fn write_valid_config(dir: &TempDir) -> PathBuf {
    let toml = r#"
[session]
buffer_capacity = 5
required_accuracy_m = 20.0
valid_time_interval_s = 3.0
valid_distance_m = 3.0
max_wait_to_move_s = 60
holding_speed_mps = 1.0
holding_rule = "every_buffered"

[sampling]
request_interval_s = 10.0
recheck_interval_s = 10.0
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

/// 20 fixes two seconds apart, 3 m north each, good accuracy.
fn write_walk_trace(dir: &TempDir) -> PathBuf {
    let mut csv = String::from("t_s,lat,lon,accuracy_m,speed_mps\n");
    for i in 0..20 {
        let lat = 52.37 + f64::from(i) * 3.0 * DEG_PER_M;
        csv.push_str(&format!("{},{lat:.8},4.89,5.0,1.5\n", 1 + 2 * i));
    }
    let path = dir.path().join("walk.csv");
    fs::write(&path, csv).unwrap();
    path
}

fn walkmeter(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("walkmeter").unwrap();
    cmd.arg("--config").arg(cfg);
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["check"], 0, "config OK", "stdout")]
#[case(&["replay"], 2, "required", "stderr")]
#[case(&["replay", "--trace", "/definitely/not/here.csv"], 4, "trace file", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let assert = walkmeter(&cfg).args(args).assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[test]
fn replay_prints_walked_distance() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let trace = write_walk_trace(&dir);

    walkmeter(&cfg)
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("walked"))
        .stdout(predicate::str::contains("km"));
}

#[test]
fn replay_json_lines_end_with_summary() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let trace = write_walk_trace(&dir);

    let out = walkmeter(&cfg)
        .arg("--json")
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .output()
        .unwrap();
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("each stdout line is JSON"))
        .collect();
    assert_eq!(lines.first().unwrap()["event"], "origin");
    let summary = lines.last().unwrap();
    assert_eq!(summary["event"], "summary");
    assert_eq!(summary["fixes"], 20);
    let total = summary["total_m"].as_f64().unwrap();
    assert!(total > 45.0 && total < 65.0, "total {total}");
    assert!(
        lines.iter().any(|l| l["event"] == "distance"),
        "no distance updates in {stdout}"
    );
}

#[test]
fn bad_trace_headers_are_explained() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let trace = dir.path().join("bad.csv");
    fs::write(&trace, "time,lat,lng\n1,52.0,4.0\n").unwrap();

    walkmeter(&cfg)
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Invalid headers"));
}

#[rstest]
#[case("t_s,lat,lon,accuracy_m,speed_mps\n1.0,52.37,4.89,5.0,1.5\n1e20,52.37,4.89,5.0,1.5\n")]
#[case("t_s,lat,lon,accuracy_m,speed_mps\n1.0,52.37,4.89,5.0,1.5\ninf,52.37,4.89,5.0,1.5\n")]
fn out_of_range_timestamps_exit_4(#[case] csv: &str) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);
    let trace = dir.path().join("far.csv");
    fs::write(&trace, csv).unwrap();

    walkmeter(&cfg)
        .arg("replay")
        .arg("--trace")
        .arg(&trace)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("row 3"));
}

#[rstest]
#[case("[session]\nbuffer_capacity = 0\n")]
#[case("[session\nbuffer_capacity = 5\n")]
#[case("[logging]\nrotation = \"weekly\"\n")]
fn bad_config_exits_3(#[case] toml: &str) {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("bad.toml");
    fs::write(&cfg, toml).unwrap();

    walkmeter(&cfg)
        .arg("check")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Configuration is invalid"));
}

#[test]
fn json_errors_are_structured() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let out = walkmeter(&cfg)
        .arg("--json")
        .arg("replay")
        .arg("--trace")
        .arg(dir.path().join("missing.csv"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(4));
    let stderr = String::from_utf8(out.stderr).unwrap();
    let last = stderr.lines().last().unwrap();
    let v: serde_json::Value = serde_json::from_str(last).unwrap();
    assert_eq!(v["reason"], "InvalidTrace");
    assert_eq!(v["exit_code"], 4);
}

#[test]
fn check_json_reports_effective_settings() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let out = walkmeter(&cfg).arg("--json").arg("check").output().unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["event"], "config");
    assert_eq!(v["required_accuracy_m"], 20.0);
}
