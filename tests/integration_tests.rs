use assert_cmd::prelude::*;
use std::process::Command;

#[test]
fn runs_without_arguments() {
    let mut cmd = Command::cargo_bin("salvm").unwrap();
    cmd.assert().success();
}

#[test]
fn runs_bare_path() {
    let mut cmd = Command::cargo_bin("salvm").unwrap();
    cmd.arg("tests/files/store.sal");
    // Stdin is empty, so the session quits right away
    cmd.assert().success();
}

#[test]
fn rejects_missing_file() {
    let mut cmd = Command::cargo_bin("salvm").unwrap();
    cmd.arg("run").arg("tests/files/does_not_exist.sal");
    cmd.assert().failure();
}

#[test]
fn rejects_zero_watermark() {
    let mut cmd = Command::cargo_bin("salvm").unwrap();
    cmd.arg("run")
        .arg("tests/files/forever.sal")
        .arg("--watermark")
        .arg("0");
    cmd.assert().failure();
}
