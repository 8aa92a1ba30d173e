//! End-to-end CLI tests via the built binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn trackd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("trackd").unwrap();
    cmd.env("TRACKD_DB", dir.path().join("trackd.db"))
        .env_remove("TRACKD_USER_EMAIL")
        .env_remove("TRACKD_USER_NAME")
        .env_remove("TRACKD_USER_GIVEN_NAME");
    cmd
}

fn signed_in(dir: &TempDir) -> Command {
    let mut cmd = trackd(dir);
    cmd.env("TRACKD_USER_EMAIL", "ada@example.com")
        .env("TRACKD_USER_NAME", "Ada Lovelace");
    cmd
}

#[test]
fn anonymous_mutation_is_rejected() {
    let dir = TempDir::new().unwrap();

    trackd(&dir)
        .args(["add", "--title", "sneaky issue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("authentication required"));

    // Nothing was stored.
    trackd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pages\": 0"));
}

#[test]
fn signed_in_lifecycle_round_trip() {
    let dir = TempDir::new().unwrap();

    signed_in(&dir)
        .args(["add", "--title", "login crash", "--owner", "ada"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": 1"));

    signed_in(&dir)
        .args(["delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"deleted\": true"));

    trackd(&dir)
        .args(["get", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("null"));

    signed_in(&dir)
        .args(["restore", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"restored\""));

    trackd(&dir)
        .args(["search", "crash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("login crash"));
}

#[test]
fn reads_work_anonymously() {
    let dir = TempDir::new().unwrap();

    signed_in(&dir)
        .args(["add", "--title", "public issue"])
        .assert()
        .success();

    trackd(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("public issue"));

    trackd(&dir)
        .arg("counts")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"New\": 1"));
}

#[test]
fn validation_errors_are_reported_together() {
    let dir = TempDir::new().unwrap();

    signed_in(&dir)
        .args(["add", "--title", "ab", "--status", "Assigned"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("title: must be at least 3 characters")
                .and(predicate::str::contains("owner: required when status is Assigned")),
        );
}

#[test]
fn invalid_status_is_rejected_at_the_boundary() {
    let dir = TempDir::new().unwrap();

    signed_in(&dir)
        .args(["add", "--title", "valid title", "--status", "Reopened"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid status: Reopened"));
}

#[test]
fn seed_populates_and_paginates() {
    let dir = TempDir::new().unwrap();

    signed_in(&dir)
        .args(["seed", "25"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"seeded\": 25"));

    trackd(&dir)
        .args(["list", "--page", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pages\": 3"));
}
