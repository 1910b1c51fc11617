//! Integration tests for the lazymemo binary.

#![cfg(all(feature = "cli", feature = "sqlite"))]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use lazymemo::{computation, Memo, MemoResult};

fn lazymemo_in(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("lazymemo").expect("binary is built");
    cmd.current_dir(dir.path());
    cmd
}

/// Stores two results of `square` and one of `cube` in the default store location.
fn populate(dir: &TempDir) {
    let memo = Memo::open(dir.path().join(".lazymemo").join("cache.db")).unwrap();
    let square = memo.memoize(computation!("square"), |&(x,): &(&i64,)| -> MemoResult<i64> {
        Ok(x * x)
    });
    let cube = memo.memoize(computation!("cube"), |&(x,): &(&i64,)| -> MemoResult<i64> {
        Ok(x * x * x)
    });

    square.call((&2,)).unwrap();
    square.call((&3,)).unwrap();
    cube.call((&2,)).unwrap();
    memo.close().unwrap();
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    lazymemo_in(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lazymemo"));
}

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    lazymemo_in(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("stats"))
                .and(predicate::str::contains("list"))
                .and(predicate::str::contains("purge"))
                .and(predicate::str::contains("clear")),
        );
}

#[test]
fn test_init_creates_config() {
    let dir = TempDir::new().unwrap();
    lazymemo_in(&dir)
        .args(["init", "--path", "project"])
        .assert()
        .success()
        .stdout(predicate::str::contains("initialized"));

    let project = dir.path().join("project");
    assert!(project.join("lazymemo.toml").exists());
    assert!(project.join(".lazymemo").is_dir());

    let config = std::fs::read_to_string(project.join("lazymemo.toml")).unwrap();
    assert!(config.contains("[store]"));

    lazymemo_in(&dir)
        .args(["init", "--path", "project"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_stats_without_store() {
    let dir = TempDir::new().unwrap();
    lazymemo_in(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("No store"));

    assert!(!dir.path().join(".lazymemo").exists());
}

#[test]
fn test_stats_counts_entries() {
    let dir = TempDir::new().unwrap();
    populate(&dir);

    lazymemo_in(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Total entries: 3")
                .and(predicate::str::contains("cli_integration::square"))
                .and(predicate::str::contains("cli_integration::cube")),
        );
}

#[test]
fn test_list_filters_by_computation() {
    let dir = TempDir::new().unwrap();
    populate(&dir);

    lazymemo_in(&dir)
        .args(["list", "--computation", "cli_integration::cube"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("cli_integration::cube")
                .and(predicate::str::contains("cli_integration::square").not()),
        );
}

#[test]
fn test_purge_then_clear() {
    let dir = TempDir::new().unwrap();
    populate(&dir);

    lazymemo_in(&dir)
        .args(["purge", "cli_integration::square"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 entries"));

    lazymemo_in(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total entries: 1"));

    lazymemo_in(&dir)
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 entries"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("lazymemo.toml"), "[store\nbroken").unwrap();

    lazymemo_in(&dir).arg("stats").assert().failure();
}
