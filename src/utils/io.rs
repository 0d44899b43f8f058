//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Write content to file with standardized error handling.
///
/// Overwrites any existing file in place. The parent directory must exist.
pub fn write_file(path: &Path, content: &str, operation: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| {
        let err = Error::internal_io(
            format!("{}: {}", path.display(), e),
            Some(operation.to_string()),
        );
        if e.kind() == std::io::ErrorKind::NotFound {
            err.with_hint("Create the output directory before generating into it")
        } else {
            err
        }
    })
}
