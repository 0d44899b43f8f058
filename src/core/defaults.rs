//! Built-in defaults for generator inputs.
//!
//! The CLI turns these into an explicit `GenerateRequest`; nothing below the
//! CLI boundary reads process state such as the working directory.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Key type used when `--keys` is not given.
pub const DEFAULT_KEY_TYPE: &str = "int";

/// Formatter used when `--formatter` is not given.
pub const DEFAULT_FORMATTER: &str = "auto";

/// Extension of generated files.
pub const GENERATED_FILE_EXTENSION: &str = "go";

pub const SCALAR_FILE_SUFFIX: &str = "loader_gen";
pub const SLICE_FILE_SUFFIX: &str = "sliceloader_gen";

pub const GOIMPORTS_PROGRAM: &str = "goimports";
pub const GOFMT_PROGRAM: &str = "gofmt";

/// Which post-processor normalizes the rendered source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    /// First of goimports, gofmt found on PATH, otherwise builtin.
    #[default]
    Auto,
    Goimports,
    Gofmt,
    Builtin,
}

impl FormatterKind {
    pub const ALL: [FormatterKind; 4] = [
        FormatterKind::Auto,
        FormatterKind::Goimports,
        FormatterKind::Gofmt,
        FormatterKind::Builtin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatterKind::Auto => "auto",
            FormatterKind::Goimports => "goimports",
            FormatterKind::Gofmt => "gofmt",
            FormatterKind::Builtin => "builtin",
        }
    }
}

impl fmt::Display for FormatterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatterKind {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                Error::validation_invalid_argument(
                    "formatter",
                    format!("expected one of: {}", names.join(", ")),
                    Some(value.to_string()),
                )
            })
    }
}
