use assert_cmd::Command as AssertCommand;
use predicates::prelude::*;
use std::io::Write;
use std::process::{Command, Stdio};

const EXACT_DUPLICATE: &str = r#"{
  "Version": "2012-10-17",
  "Statement": [
    {"Sid": "A", "Effect": "Allow", "Action": "s3:GetObject", "Resource": "*"},
    {"Sid": "B", "Effect": "Allow", "Action": ["s3:GetObject"], "Resource": "*"}
  ]
}"#;

const WILDCARD_DUPLICATE: &str = r#"{
  "Statement": [
    {"Effect": "Allow", "Action": "s3:*", "Resource": "*"},
    {"Effect": "Allow", "Action": "s3:GetObject", "Resource": "arn:aws:s3:::bucket/*"}
  ]
}"#;

const NEGATED: &str = r#"[
  {"Effect": "Allow", "Action": "s3:GetObject", "Resource": "*"},
  {"Effect": "Allow", "NotAction": "s3:GetObject", "Resource": "*"}
]"#;

const DIFFERENT_EFFECTS: &str = r#"[
  {"Effect": "Allow", "Action": "ec2:StartInstances", "Resource": "*"},
  {"Effect": "Deny", "Action": "ec2:StartInstances", "Resource": "*"}
]"#;

fn policy_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp file");
    file
}

fn check_policy_from_stdin(policy: &str, extra_args: &[&str]) -> std::process::Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_iam-policy-audit"))
        .arg("check-policy")
        .args(extra_args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn check-policy");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(policy.as_bytes())
        .expect("failed to write policy to stdin");
    child.wait_with_output().expect("failed to wait on check-policy")
}

#[test]
fn help_lists_subcommands() {
    let out = Command::new(env!("CARGO_BIN_EXE_iam-policy-audit"))
        .arg("--help")
        .output()
        .expect("failed to run --help");
    let s = String::from_utf8_lossy(&out.stdout);
    assert_eq!(out.status.code(), Some(0));
    for subcommand in [
        "check-policy",
        "duplicate-statements",
        "duplicate-policies",
        "statement-count",
        "group-diff",
        "iam-users",
        "identity-store-users",
        "permission-set-search",
    ] {
        assert!(s.contains(subcommand), "help should list {subcommand}: {s}");
    }
}

#[test]
fn test_check_policy_exact_match_from_file() {
    let file = policy_file(EXACT_DUPLICATE);
    let output = Command::new(env!("CARGO_BIN_EXE_iam-policy-audit"))
        .arg("check-policy")
        .arg(file.path())
        .output()
        .expect("failed to run check-policy");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0));
    assert!(
        stdout.starts_with("MatchType,FirstIndex,SecondIndex,StatementA,StatementB"),
        "stdout was: {}",
        stdout
    );
    assert!(stdout.contains("ExactMatch,0,1"), "stdout was: {}", stdout);
}

#[test]
fn test_check_policy_wildcard_match_from_stdin() {
    let output = check_policy_from_stdin(WILDCARD_DUPLICATE, &[]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("WildcardMatch"), "stdout was: {}", stdout);
}

#[test]
fn test_check_policy_negated_needs_manual_check() {
    let output = check_policy_from_stdin(NEGATED, &[]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout.contains("NeedsManualCheck"), "stdout was: {}", stdout);
}

#[test]
fn test_check_policy_json_output() {
    let output = check_policy_from_stdin(EXACT_DUPLICATE, &["--format", "json"]);
    assert_eq!(output.status.code(), Some(0));

    let pairs: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let pairs = pairs.as_array().expect("stdout should be a JSON array");
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0]["MatchType"], "ExactMatch");
    assert_eq!(pairs[0]["First"]["Sid"], "A");
    assert_eq!(pairs[0]["Second"]["Sid"], "B");
}

#[test]
fn test_check_policy_different_effects_report_nothing() {
    AssertCommand::cargo_bin("iam-policy-audit")
        .expect("binary should be built")
        .args(["check-policy", "--format", "json"])
        .write_stdin(DIFFERENT_EFFECTS)
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"))
        .stderr(predicate::str::contains("Found 0 duplicate statement pairs"));
}

#[test]
fn test_check_policy_malformed_json_fails() {
    let output = check_policy_from_stdin("{not json", &[]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("Error:"), "stderr was: {}", stderr);
}

#[test]
fn test_check_policy_missing_file_fails() {
    AssertCommand::cargo_bin("iam-policy-audit")
        .expect("binary should be built")
        .args(["check-policy", "/nonexistent/policy.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read policy file"));
}

#[test]
fn test_principal_type_requires_iam_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_iam-policy-audit"))
        .args(["duplicate-statements", "--principal-type", "user"])
        .output()
        .expect("failed to run duplicate-statements");

    // clap usage errors exit with 2
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_permission_set_search_requires_a_keyword() {
    AssertCommand::cargo_bin("iam-policy-audit")
        .expect("binary should be built")
        .args(["permission-set-search", "--managed", " "])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("at least one --managed or --inline keyword"));
}
