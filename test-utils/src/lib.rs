//! Helpers for driving the built interpreter binary in integration tests:
//! feed a program through stdin, then compare the transcript against an
//! [`Expected`] description.

use std::{
    error::Error,
    io::Write,
    process::{Command, Output, Stdio},
    str,
};

pub struct Expected<'a> {
    pub stdout: &'a str,
    pub stderr: StderrExpectation<'a>,
    pub status: i32,
}

pub enum StderrExpectation<'a> {
    Empty,
    Contains(&'a str),
}

/// Run the interpreter at `binary` with `source` piped into stdin.
pub fn run_interpreter(binary: &str, source: &str) -> Result<Output, Box<dyn Error>> {
    let mut child = Command::new(binary)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(source.as_bytes())?;

    Ok(child.wait_with_output()?)
}

pub fn check_run(binary: &str, source: &str, expected: Expected) -> Result<(), Box<dyn Error>> {
    let output = run_interpreter(binary, source)?;
    let stdout = str::from_utf8(&output.stdout)?;
    let stderr = str::from_utf8(&output.stderr)?;

    assert_eq!(
        expected.stdout, stdout,
        "stdout mismatch; stderr was: {stderr}"
    );
    match expected.stderr {
        StderrExpectation::Empty => {
            assert!(stderr.is_empty(), "unexpected stderr: {stderr}");
        }
        StderrExpectation::Contains(needle) => {
            assert!(
                stderr.contains(needle),
                "stderr {stderr:?} does not contain {needle:?}"
            );
        }
    }
    assert_eq!(Some(expected.status), output.status.code());

    Ok(())
}
