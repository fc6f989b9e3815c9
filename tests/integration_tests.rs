//! Integration tests for the Factorizer CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn factorizer() -> Command {
    let mut cmd = Command::cargo_bin("factorizer").unwrap();
    // Keep the user's environment from leaking into the layered config
    cmd.env_remove("RUST_LOG")
        .env("HOME", std::env::temp_dir());
    cmd
}

/// Test CLI binary exists and responds to --help
#[test]
fn test_cli_help() {
    factorizer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Classify integer ranges"));
}

/// Test CLI responds to --version
#[test]
fn test_cli_version() {
    factorizer()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("factorizer"));
}

/// Test invalid subcommand shows error
#[test]
fn test_invalid_subcommand() {
    factorizer()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_run_reports_counts() {
    let temp_dir = TempDir::new().unwrap();
    factorizer()
        .current_dir(temp_dir.path())
        .args(["run", "--start", "2", "--end", "100", "--strategy", "sequential"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Primes"))
        .stdout(predicate::str::contains("25"))
        .stdout(predicate::str::contains("74"));
}

#[test]
fn test_run_json_with_listing() {
    let temp_dir = TempDir::new().unwrap();
    let assert = factorizer()
        .current_dir(temp_dir.path())
        .args(["run", "--end", "13", "--strategy", "pool", "--workers", "2"])
        .args(["--format", "json", "--list"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(doc["report"]["primes"], 6);
    assert_eq!(doc["report"]["workers"], 2);
    assert_eq!(doc["primes"], serde_json::json!([2, 3, 5, 7, 11, 13]));
    assert_eq!(doc["nonprimes"]["12"], serde_json::json!([1, 2, 3, 4, 6, 12]));
}

#[test]
fn test_run_rejects_reversed_range() {
    let temp_dir = TempDir::new().unwrap();
    factorizer()
        .current_dir(temp_dir.path())
        .args(["run", "--start", "3", "--end", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid range"));
}

#[test]
fn test_run_rejects_negative_bound() {
    let temp_dir = TempDir::new().unwrap();
    factorizer()
        .current_dir(temp_dir.path())
        .args(["run", "--start", "-4", "--end", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid range"));
}

#[test]
fn test_run_rejects_zero_workers() {
    let temp_dir = TempDir::new().unwrap();
    factorizer()
        .current_dir(temp_dir.path())
        .args(["run", "--end", "10", "--strategy", "pool", "--workers", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid pool capacity"));
}

#[test]
fn test_repo_config_sets_default_strategy() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("factorizer.toml"),
        "[run]\nstrategy = \"stream\"\n\n[output]\nformat = \"json\"\n",
    )
    .unwrap();

    factorizer()
        .current_dir(temp_dir.path())
        .args(["run", "--end", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"strategy\": \"stream\""));
}

#[test]
fn test_env_overrides_config_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("factorizer.toml"),
        "[run]\nstrategy = \"stream\"\n",
    )
    .unwrap();

    factorizer()
        .current_dir(temp_dir.path())
        .env("FACTORIZER_RUN__STRATEGY", "sequential")
        .args(["run", "--end", "50", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"strategy\": \"sequential\""));
}

#[test]
fn test_prompt_loop() {
    let temp_dir = TempDir::new().unwrap();
    factorizer()
        .current_dir(temp_dir.path())
        .arg("prompt")
        .write_stdin("100\n3\n0\n1000\n4\n-1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Prime list size: 25"))
        .stdout(predicate::str::contains("Prime list size: 168"));
}

#[test]
fn test_compare_all_strategies() {
    let temp_dir = TempDir::new().unwrap();
    factorizer()
        .current_dir(temp_dir.path())
        .args(["compare", "--end", "2000", "--workers", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unbounded"))
        .stdout(predicate::str::contains("identical results"));
}

#[test]
fn test_compare_json_skip() {
    let temp_dir = TempDir::new().unwrap();
    let assert = factorizer()
        .current_dir(temp_dir.path())
        .args(["compare", "--end", "500", "--skip", "unbounded", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(doc["consistent"], true);
    assert_eq!(doc["runs"].as_array().unwrap().len(), 3);
}

#[test]
fn test_watch_without_terminal_completes() {
    let temp_dir = TempDir::new().unwrap();
    factorizer()
        .current_dir(temp_dir.path())
        .args(["watch", "--start", "2", "--end", "5000", "--no-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("669"));
}

#[test]
fn test_watch_strategy_follows_config() {
    let temp_dir = TempDir::new().unwrap();
    factorizer()
        .current_dir(temp_dir.path())
        .args(["watch", "--start", "2", "--end", "100", "--no-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("with stream"));

    fs::write(
        temp_dir.path().join("factorizer.toml"),
        "[watch]\nstrategy = \"pool\"\n",
    )
    .unwrap();

    factorizer()
        .current_dir(temp_dir.path())
        .args(["watch", "--start", "2", "--end", "100", "--no-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("with pool"));
}

#[test]
fn test_config_show_json() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("custom.yaml");
    fs::write(&config_path, "run:\n  workers: 5\n").unwrap();

    factorizer()
        .current_dir(temp_dir.path())
        .arg("--config")
        .arg(&config_path)
        .args(["config", "show", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"workers\": 5"));
}

#[test]
fn test_missing_config_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    factorizer()
        .current_dir(temp_dir.path())
        .args(["--config", "nope.toml", "run", "--end", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}
