use assert_cmd::prelude::*;
use predicates::str::contains;
use std::process::Command;

#[test]
fn smoke_defaults() {
    Command::cargo_bin("taskpool-smoke")
        .unwrap()
        .assert()
        .success()
        .stdout(contains("completed 50000/50000 tasks on 8 threads"));
}

#[test]
fn smoke_custom_sizes() {
    Command::cargo_bin("taskpool-smoke")
        .unwrap()
        .args(["--threads", "2", "--tasks", "1234"])
        .assert()
        .success()
        .stdout(contains("completed 1234/1234 tasks on 2 threads"));
}

#[test]
fn smoke_zero_tasks() {
    Command::cargo_bin("taskpool-smoke")
        .unwrap()
        .args(["--threads", "1", "--tasks", "0"])
        .assert()
        .success()
        .stdout(contains("completed 0/0 tasks on 1 threads"));
}

#[test]
fn smoke_zero_threads_fails() {
    Command::cargo_bin("taskpool-smoke")
        .unwrap()
        .args(["--threads", "0", "--tasks", "3"])
        .assert()
        .failure()
        .stdout(contains("completed 0/3 tasks on 0 threads"));
}

#[test]
fn smoke_rejects_invalid_args() {
    Command::cargo_bin("taskpool-smoke")
        .unwrap()
        .args(["--threads", "many"])
        .assert()
        .failure();
}

#[test]
fn smoke_version() {
    Command::cargo_bin("taskpool-smoke")
        .unwrap()
        .arg("-V")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}
