//! Command execution primitives with consistent error handling.

use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::error::{Error, Result};

/// Captured output from command execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CapturedOutput {
    pub success: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

impl CapturedOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Prefers stderr, falls back to stdout if stderr is empty.
    pub fn error_text(&self) -> String {
        if !self.stderr.trim().is_empty() {
            self.stderr.trim().to_string()
        } else {
            self.stdout.trim().to_string()
        }
    }
}

/// Run a command feeding `input` on stdin and capture its output untrimmed.
///
/// Only a failure to spawn or talk to the process is an error; a non-zero
/// exit is reported through `CapturedOutput::success`.
pub fn run_with_stdin(
    program: &Path,
    args: &[&str],
    input: &str,
    context: &str,
) -> Result<CapturedOutput> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            Error::internal_io(
                format!("Failed to run {}: {}", program.display(), e),
                Some(context.to_string()),
            )
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .map_err(|e| Error::internal_io(e.to_string(), Some(context.to_string())))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| Error::internal_io(e.to_string(), Some(context.to_string())))?;

    Ok(CapturedOutput::from_output(&output))
}

/// Locate an executable on `PATH`.
pub fn find_program(program: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .flat_map(|dir| candidates(&dir, program))
        .find(|candidate| candidate.is_file())
}

fn candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![dir.join(format!("{}.exe", program)), dir.join(program)]
    } else {
        vec![dir.join(program)]
    }
}
