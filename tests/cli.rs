//! Command-line behaviour of the `pdf2txt` binary.
//!
//! Run with:
//!   cargo test --test cli

#![cfg(unix)]

use std::process::Command;

const USAGE_LINE: &str =
    "Please specify the root directory of PDF input files (-h/--help for help)";

fn pdf2txt() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pdf2txt"));
    for var in ["PDF2TXT_RESUME", "PDF2TXT_JPGDIR", "PDF2TXT_TEXTDIR", "RUST_LOG"] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn missing_input_argument_is_a_usage_error() {
    let tmp = tempfile::tempdir().unwrap();

    let out = pdf2txt()
        .current_dir(tmp.path())
        .output()
        .expect("spawn pdf2txt");

    assert_eq!(out.status.code(), Some(255), "exit(-1) is 255 on unix");
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), USAGE_LINE);
    assert!(!tmp.path().join("jpg").exists());
    assert!(!tmp.path().join("text").exists());
}

#[test]
fn help_lists_resume_flag() {
    let out = pdf2txt().arg("--help").output().expect("spawn pdf2txt");

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("--resume"));
    assert!(stdout.contains("--jpgdir"));
    assert!(stdout.contains("--textdir"));
}
