//! End-to-end behaviour of the `sl-emit` binary, including `fatal`.

use std::process::{Command, Output};

fn sl_emit(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sl-emit"))
        .args(args)
        .env("LOGGER_WRITER", "stderr")
        .env("LOGGER_IS_JSON", "true")
        .env("LOGGER_ADD_SOURCE", "true")
        .env("LOGGER_LEVEL", "info")
        .env("LOGGER_TYPE", "default")
        .env("LOGGER_SET_DEFAULT", "true")
        .env_remove("LOGGER_OUT_PATH")
        .output()
        .unwrap()
}

fn stderr_json(out: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&out.stderr)
        .lines()
        .filter(|l| l.starts_with('{'))
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

#[test]
fn test_fatal_logs_then_exits_with_status_one() {
    let out = sl_emit(&["--fatal", "boom", "code=7"]);

    assert_eq!(out.status.code(), Some(1));
    let lines = stderr_json(&out);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["msg"], "boom");
    assert_eq!(lines[0]["level"], "ERROR");
    assert_eq!(lines[0]["code"], 7);
    assert!(lines[0]["fatal_source"].as_str().unwrap().contains("sl-emit.rs:"));
    assert!(lines[0].get("source").is_none());
}

#[test]
fn test_fatal_source_is_top_level_inside_group() {
    let out = sl_emit(&["--group", "req", "--fatal", "boom", "code=7"]);

    assert_eq!(out.status.code(), Some(1));
    let lines = stderr_json(&out);
    assert_eq!(lines.len(), 1);
    assert!(lines[0]["fatal_source"].as_str().unwrap().contains("sl-emit.rs:"));
    assert_eq!(lines[0]["req"], serde_json::json!({"code": 7}));
}

#[test]
fn test_regular_record_exits_cleanly() {
    let out = sl_emit(&["--level", "warn", "careful", "user=ada", "retry=true"]);

    assert_eq!(out.status.code(), Some(0));
    let lines = stderr_json(&out);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["level"], "WARN");
    assert_eq!(lines[0]["user"], "ada");
    assert_eq!(lines[0]["retry"], true);
    assert!(lines[0]["source"]["file"].as_str().unwrap().ends_with("sl-emit.rs"));
}

#[test]
fn test_below_level_is_silent() {
    let out = sl_emit(&["--level", "debug", "hidden"]);

    assert_eq!(out.status.code(), Some(0));
    assert!(stderr_json(&out).is_empty());
}

#[test]
fn test_bad_config_exits_with_status_two() {
    let out = Command::new(env!("CARGO_BIN_EXE_sl-emit"))
        .arg("msg")
        .env("LOGGER_WRITER", "printer")
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(2));
}
