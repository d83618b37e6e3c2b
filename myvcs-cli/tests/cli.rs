use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn myvcs(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("myvcs").unwrap();
    cmd.current_dir(dir.path()).env("NO_COLOR", "1");
    cmd
}

fn head(dir: &TempDir) -> String {
    fs::read_to_string(dir.path().join(".myvcs").join("HEAD")).unwrap()
}

#[test]
fn init_twice_reports_existing_repository() {
    let dir = TempDir::new().unwrap();

    myvcs(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Repository initialized"));
    myvcs(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Repository already exists."));
}

#[test]
fn commands_outside_a_repository_fail() {
    let dir = TempDir::new().unwrap();

    myvcs(&dir)
        .arg("log")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a repository"));
}

#[test]
fn add_commit_status_checkout() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "hello\n").unwrap();

    myvcs(&dir).arg("init").assert().success();
    myvcs(&dir)
        .args(["add", "a.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added a.txt"));
    myvcs(&dir)
        .args(["add", "a.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already staged"));
    myvcs(&dir)
        .args(["commit", "first"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Committed as"));

    let id = head(&dir);
    myvcs(&dir)
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Commit {id}")))
        .stdout(predicate::str::contains("Message: first"));

    fs::write(dir.path().join("a.txt"), "world\n").unwrap();
    myvcs(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes to be committed."))
        .stdout(predicate::str::contains("Line 1 changed:"))
        .stdout(predicate::str::contains("- hello"))
        .stdout(predicate::str::contains("+ world"));

    myvcs(&dir)
        .args(["checkout", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored a.txt"));
    assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "hello\n");
}

#[test]
fn commit_without_staged_files_fails() {
    let dir = TempDir::new().unwrap();

    myvcs(&dir).arg("init").assert().success();
    myvcs(&dir)
        .args(["commit", "nothing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to commit"));
}

#[test]
fn repo_flag_targets_another_directory() {
    let dir = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();

    myvcs(&elsewhere)
        .args(["-C", dir.path().to_str().unwrap(), "init"])
        .assert()
        .success();
    assert!(dir.path().join(".myvcs").is_dir());
    assert!(!elsewhere.path().join(".myvcs").exists());
}

#[test]
fn verbose_flag_logs_repository_root() {
    let dir = TempDir::new().unwrap();

    myvcs(&dir).arg("init").assert().success();
    myvcs(&dir)
        .env_remove("RUST_LOG")
        .args(["-vv", "log"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Opening repository at"));
}
