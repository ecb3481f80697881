use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

/// Without an endpoint the audit runs fully local and deterministic.
#[test]
fn test_single_password_local_audit() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("audit.json");

    cargo_bin_cmd!("passlens")
        .args(&["Tr0ub4dor&3", "-o", output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("local heuristics"))
        .stdout(predicate::str::contains("Strong"))
        .stdout(predicate::str::contains("T*********3"))
        .stdout(predicate::str::contains("AUDIT SUMMARY"));
}

/// The raw password must never appear in terminal output.
#[test]
fn test_password_is_masked_in_output() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("audit.json");

    cargo_bin_cmd!("passlens")
        .args(&["Tr0ub4dor&3", "-o", output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tr0ub4dor&3").not());
}

/// List file audits every line and reports the total.
#[test]
fn test_list_file_audit() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "password").unwrap();
    writeln!(file, "Tr0ub4dor&3").unwrap();
    writeln!(file, "K7#mVq2$wXp9Lz").unwrap();

    let dir = tempdir().unwrap();
    let output = dir.path().join("audit.json");
    let path = file.path().to_str().unwrap().to_string();

    cargo_bin_cmd!("passlens")
        .args(&["-l", &path, "-o", output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 3 password(s)"))
        .stdout(predicate::str::contains("3"))
        .stdout(predicate::str::contains("AUDIT SUMMARY"));
}

/// A trivial password lands in the rotate-first section of the summary.
#[test]
fn test_weak_password_flagged_in_summary() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("audit.json");

    cargo_bin_cmd!("passlens")
        .args(&["123456", "-o", output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("extremely common"))
        .stdout(predicate::str::contains("Rotate these first"));
}

/// Each outcome is appended to the output file as one JSON line.
#[test]
fn test_output_file_holds_json_lines() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("audit.json");

    cargo_bin_cmd!("passlens")
        .args(&["Tr0ub4dor&3", "-o", output.to_str().unwrap()])
        .assert()
        .success();

    let contents = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 1);

    let outcome: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(outcome["report"]["strength"]["score"], 73);
    assert_eq!(outcome["subject"], "T*********3");
    assert_eq!(outcome["source"], "heuristic");
}

/// Running with no arguments should fail (clap requires a password or -l).
#[test]
fn test_no_args_shows_error() {
    cargo_bin_cmd!("passlens").assert().failure();
}

/// An endpoint that is not a URL is rejected before any request is made.
#[test]
fn test_invalid_endpoint_rejected() {
    cargo_bin_cmd!("passlens")
        .args(&["secret", "--endpoint", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid endpoint URL"));
}

/// --offline wins over --endpoint: no request is attempted.
#[test]
fn test_offline_overrides_endpoint() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("audit.json");

    cargo_bin_cmd!("passlens")
        .args(&[
            "Tr0ub4dor&3",
            "--endpoint",
            "https://analysis.invalid/api",
            "--offline",
            "-o",
            output.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Local heuristics only"))
        .stdout(predicate::str::contains("local heuristics"));
}
