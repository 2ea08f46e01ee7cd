use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn make_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before UNIX_EPOCH")
        .as_nanos();
    let pid = std::process::id();
    let dir = std::env::temp_dir().join(format!("argot-integ-{prefix}-{pid}-{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn argot() -> Command {
    Command::new(env!("CARGO_BIN_EXE_argot"))
}

fn write_defs(dir: &Path, defs: &Value) -> PathBuf {
    let path = dir.join("defs.json");
    fs::write(&path, serde_json::to_string_pretty(defs).unwrap()).expect("failed to write defs");
    path
}

fn assert_success(out: &Output, what: &str) {
    assert!(
        out.status.success(),
        "{what} failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );
}

fn stdout_json(out: &Output) -> Value {
    serde_json::from_slice(&out.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}):\n{}",
            String::from_utf8_lossy(&out.stdout)
        )
    })
}

#[test]
fn help_works() {
    let out = argot()
        .arg("--help")
        .output()
        .expect("failed to run argot --help");
    assert_success(&out, "argot --help");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("argot") && stdout.contains("parse") && stdout.contains("split"),
        "unexpected help output:\n{stdout}"
    );
}

#[test]
fn parse_prints_flat_result() {
    let dir = make_temp_dir("parse-flat");
    let defs = write_defs(
        &dir,
        &json!({
            "format-version": 1,
            "options": [
                { "name": "verbose", "alias": "v", "type": "boolean" },
                { "name": "src", "multiple": true, "default-option": true },
                { "name": "level", "type": "number", "default-value": 1 }
            ]
        }),
    );

    let out = argot()
        .args(["parse", "--definitions"])
        .arg(&defs)
        .args(["--", "-v", "a.js", "b.js", "--level", "3"])
        .output()
        .expect("failed to run argot parse");
    assert_success(&out, "argot parse");
    assert_eq!(
        stdout_json(&out),
        json!({ "verbose": true, "src": ["a.js", "b.js"], "level": 3 })
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_partial_collects_unknown() {
    let dir = make_temp_dir("parse-partial");
    let defs = write_defs(
        &dir,
        &json!({ "format-version": 1, "options": [{ "name": "dry-run", "type": "boolean" }] }),
    );

    let out = argot()
        .args(["parse", "--partial", "--camel-case", "--definitions"])
        .arg(&defs)
        .args(["--", "--dry-run", "--what", "x"])
        .output()
        .expect("failed to run argot parse");
    assert_success(&out, "argot parse --partial");
    assert_eq!(
        stdout_json(&out),
        json!({ "dryRun": true, "_unknown": ["--what", "x"] })
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_strict_unknown_fails() {
    let dir = make_temp_dir("parse-strict");
    let defs = write_defs(&dir, &json!({ "format-version": 1, "options": [{ "name": "one" }] }));

    let out = argot()
        .args(["parse", "--definitions"])
        .arg(&defs)
        .args(["--", "--two"])
        .output()
        .expect("failed to run argot parse");
    assert!(!out.status.success(), "strict parse unexpectedly succeeded");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("--two"), "unexpected stderr:\n{stderr}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn parse_with_commands_splits_first() {
    let dir = make_temp_dir("parse-commands");
    let defs = write_defs(
        &dir,
        &json!({
            "format-version": 1,
            "options": [{ "name": "verbose", "alias": "v", "type": "boolean" }],
            "commands": [
                { "name": "build", "aliases": ["b"], "options": [{ "name": "out", "alias": "o" }] }
            ]
        }),
    );

    let out = argot()
        .args(["parse", "-d"])
        .arg(&defs)
        .args(["--", "b", "-v", "-o", "dist"])
        .output()
        .expect("failed to run argot parse");
    assert_success(&out, "argot parse with commands");
    assert_eq!(
        stdout_json(&out),
        json!({ "command": "build", "options": { "verbose": true, "out": "dist" } })
    );

    let out = argot()
        .args(["parse", "-d"])
        .arg(&defs)
        .args(["--", "deploy"])
        .output()
        .expect("failed to run argot parse");
    assert!(!out.status.success(), "unknown command unexpectedly accepted");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn split_with_and_without_fallback() {
    let out = argot()
        .args(["split", "--command", "eat", "--command", "sleep", "--"])
        .args(["sleep", "--hours", "8"])
        .output()
        .expect("failed to run argot split");
    assert_success(&out, "argot split");
    assert_eq!(
        stdout_json(&out),
        json!({ "command": "sleep", "argv": ["--hours", "8"] })
    );

    let out = argot()
        .args(["split", "-c", "eat", "--allow-none", "--", "foo"])
        .output()
        .expect("failed to run argot split");
    assert_success(&out, "argot split --allow-none");
    assert_eq!(stdout_json(&out), json!({ "command": null, "argv": ["foo"] }));

    let out = argot()
        .args(["split", "-c", "eat", "--", "foo"])
        .output()
        .expect("failed to run argot split");
    assert!(!out.status.success(), "unrecognised command accepted");
}

#[test]
fn check_reports_invalid_definitions() {
    let dir = make_temp_dir("check");
    let good = write_defs(
        &dir,
        &json!({ "format-version": 1, "options": [{ "name": "one", "alias": "o" }] }),
    );
    let out = argot()
        .args(["check", "--json", "--definitions"])
        .arg(&good)
        .output()
        .expect("failed to run argot check");
    assert_success(&out, "argot check");
    assert_eq!(stdout_json(&out)["valid"], json!(true));

    let bad = write_defs(
        &dir,
        &json!({
            "format-version": 1,
            "options": [
                { "name": "a", "default-option": true },
                { "name": "b", "default-option": true }
            ]
        }),
    );
    let out = argot()
        .args(["check", "--json", "--definitions"])
        .arg(&bad)
        .output()
        .expect("failed to run argot check");
    assert!(!out.status.success(), "invalid definitions accepted");
    let report = stdout_json(&out);
    assert_eq!(report["valid"], json!(false));
    assert_eq!(report["errors"].as_array().map(Vec::len), Some(1));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn rejects_unsupported_format_version() {
    let dir = make_temp_dir("format-version");
    let defs = write_defs(&dir, &json!({ "format-version": 2 }));
    let out = argot()
        .args(["check", "--definitions"])
        .arg(&defs)
        .output()
        .expect("failed to run argot check");
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("format-version"), "unexpected stderr:\n{stderr}");

    let _ = fs::remove_dir_all(&dir);
}
