use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_data_dir_flag() {
    Command::cargo_bin("school-records")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--data-dir"));
}

#[test]
fn unknown_flag_is_rejected() {
    Command::cargo_bin("school-records")
        .expect("binary")
        .arg("--no-such-flag")
        .assert()
        .failure();
}
