//! Helpers for driving the compiled `dcc` binary in integration tests.
//!
//! Each helper writes the source under test into a fresh temporary
//! directory, runs the compiler over it and captures stdout, stderr and the
//! exit status.

use std::{
    error::Error,
    fs,
    process::{Command, Output},
};

use tempfile::TempDir;

const DCC_PATH: &str = "./target/debug/dcc";

pub fn compile(source: &str) -> Result<Output, Box<dyn Error>> {
    let dir = TempDir::new()?;
    let src_path = dir.path().join("input.c");
    fs::write(&src_path, source)?;

    let output = Command::new(DCC_PATH).arg(&src_path).output()?;
    Ok(output)
}

/// Compile `source`, assert success and return the emitted assembly.
pub fn compile_success(source: &str) -> Result<String, Box<dyn Error>> {
    let output = compile(source)?;
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "dcc exited with status {:?}: {stderr}",
        output.status.code()
    );
    assert!(stderr.is_empty(), "{stderr}");

    Ok(String::from_utf8(output.stdout)?)
}

/// Compile `source`, assert it fails with status 1 and return the rendered
/// diagnostic.
pub fn compile_failure(source: &str) -> Result<String, Box<dyn Error>> {
    let output = compile(source)?;

    assert_eq!(
        output.status.code(),
        Some(1),
        "dcc should exit with status 1"
    );

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    assert!(!stderr.is_empty(), "expected a diagnostic on stderr");
    Ok(stderr)
}
