use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn cmd() -> assert_cmd::Command {
    cargo_bin_cmd!("gantry")
}

#[test]
fn test_missing_image_is_a_usage_error() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"))
        .stderr(predicate::str::contains("IMAGE"));
}

#[test]
fn test_help_describes_the_pipeline() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("security assessment"))
        .stdout(predicate::str::contains("--attacks"))
        .stdout(predicate::str::contains("--policies"))
        .stdout(predicate::str::contains("--output-dir"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gantry"));
}

#[test]
fn test_unknown_flag_is_rejected() {
    cmd()
        .args(["--no-such-flag", "alpine"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
}
