//! Argument-surface contract: exactly one of --character / --enhancement,
//! and enhancement runs carry their source identity.

use assert_cmd::Command;
use predicates::prelude::*;

fn cibench() -> Command {
    Command::cargo_bin("cibench").unwrap()
}

#[test]
fn run_requires_an_identity_flag() {
    cibench()
        .args(["run", "--bot", "nomi-ai", "--tier", "1", "--variant", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn character_and_enhancement_are_mutually_exclusive() {
    cibench()
        .args([
            "run",
            "--bot",
            "nomi-ai",
            "--character",
            "emilia",
            "--enhancement",
            "cot",
            "--tier",
            "1",
            "--variant",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn source_character_needs_an_enhancement() {
    cibench()
        .args([
            "run",
            "--bot",
            "kindroid",
            "--character",
            "matteo",
            "--source-character",
            "emilia",
            "--tier",
            "2",
            "--variant",
            "1",
        ])
        .assert()
        .failure();
}

#[test]
fn tier_out_of_range_is_rejected() {
    cibench()
        .args([
            "run",
            "--bot",
            "nomi-ai",
            "--character",
            "emilia",
            "--tier",
            "4",
            "--variant",
            "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
