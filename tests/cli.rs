use std::fs;
use std::process::{
    Command,
    Output,
};

use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_esp-partition-gen"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_no_arguments_prints_reference_table() {
    let output = run(&[]);

    let expected = fs::read_to_string("tests/assets/reference.csv").unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), expected);
    assert_eq!(String::from_utf8(output.stderr).unwrap(), "");
}

#[test]
fn test_flags_override_layout_file() {
    let output = run(&["--layout", "tests/assets/8mb.toml", "--start", "0x10000"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("nvs,data,nvs,0x10000,0x5000,\n"));
    assert!(stdout.contains("app0,app,ota_0,,0x374800,\n"));
    assert!(stdout.contains("spiffs,data,spiffs,,0x100000,\n"));
}

#[test]
fn test_check_matching_table() {
    let output = run(&["--check", "tests/assets/hand_aligned.csv"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_check_stale_table() {
    let output = run(&["--check", "tests/assets/stale.csv"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("found app0 (app/ota_0) size 0x1c0000"));
}

#[test]
fn test_output_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partitions.csv");

    let output = run(&["--output", path.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let expected = fs::read_to_string("tests/assets/reference.csv").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), expected);
}

#[test]
fn test_configuration_error_is_reported() {
    let output = run(&["--flash-size", "0x30000"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains(
        "reserved regions need 0x30000 of 0x30000 flash bytes, app slots are short by 0x2 bytes"
    ));
}

#[test]
fn test_invalid_size_flag() {
    let output = run(&["--flash-size", "lots"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
