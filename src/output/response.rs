//! CLI response formatting and output.
//!
//! Provides the JSON envelope, human-readable error printing, and exit code mapping.

use dataloaden::error::Hint;
use dataloaden::{Error, ErrorCode, Result};
use serde::Serialize;
use std::io::{self, Write};

pub const USAGE_EXIT_CODE: i32 = 1;
pub const FAILURE_EXIT_CODE: i32 = 2;

#[derive(Debug, Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CliError>,
}

#[derive(Debug, Serialize)]
pub struct CliError {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<Hint>>,
}

impl<T: Serialize> CliResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub(crate) fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::internal_json(e.to_string(), Some("serialize response".to_string()))
        })
    }
}

impl CliResponse<()> {
    pub fn from_error(err: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(CliError {
                code: err.code.as_str().to_string(),
                message: err.message.clone(),
                details: err.details.clone(),
                hints: if err.hints.is_empty() {
                    None
                } else {
                    Some(err.hints.clone())
                },
            }),
        }
    }
}

fn print_response<T: Serialize>(response: &CliResponse<T>) -> Result<()> {
    let payload = response.to_json()?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", payload) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            return Ok(()); // Exit gracefully on SIGPIPE
        }
        return Err(Error::internal_io(
            e.to_string(),
            Some("write stdout".to_string()),
        ));
    }
    Ok(())
}

pub fn print_success<T: Serialize>(data: T) -> Result<()> {
    print_response(&CliResponse::success(data))
}

/// Human-readable error with its hints, on stderr.
pub fn print_error(err: &Error) {
    eprintln!("{}", render_error(err));
}

pub(crate) fn render_error(err: &Error) -> String {
    let mut text = format!("error: {}", err.message);
    for hint in &err.hints {
        text.push_str("\nhint: ");
        text.push_str(&hint.message);
    }
    text
}

/// Report a command result and return the process exit code.
///
/// Errors always go to stderr; with `json` the envelope is also written to stdout.
pub fn finish<T: Serialize>(result: Result<(T, i32)>, json: bool) -> i32 {
    match result {
        Ok((data, exit_code)) => {
            if !json {
                return exit_code;
            }
            match print_success(data) {
                Ok(()) => exit_code,
                Err(err) => {
                    print_error(&err);
                    exit_code_for_error(err.code)
                }
            }
        }
        Err(err) => {
            print_error(&err);
            if json {
                // Nothing more useful can be reported if stdout is gone
                let _ = print_response(&CliResponse::<()>::from_error(&err));
            }
            exit_code_for_error(err.code)
        }
    }
}

pub fn exit_code_for_error(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::ValidationMissingArgument | ErrorCode::ValidationInvalidArgument => {
            USAGE_EXIT_CODE
        }

        ErrorCode::TypeReferenceInvalid
        | ErrorCode::ModuleResolutionFailed
        | ErrorCode::NameCollision
        | ErrorCode::RenderFailed
        | ErrorCode::FormatFailed
        | ErrorCode::InternalIoError
        | ErrorCode::InternalJsonError => FAILURE_EXIT_CODE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors_exit_with_one() {
        let err = "nope".parse::<dataloaden::defaults::FormatterKind>().unwrap_err();
        assert_eq!(exit_code_for_error(err.code), 1);
        assert_eq!(
            exit_code_for_error(ErrorCode::ValidationMissingArgument),
            USAGE_EXIT_CODE
        );
    }

    #[test]
    fn pipeline_errors_exit_with_two() {
        let err = Error::type_reference_invalid("User", "type must be in the form package.Name");
        assert_eq!(exit_code_for_error(err.code), 2);
        assert_eq!(exit_code_for_error(ErrorCode::FormatFailed), 2);
        assert_eq!(exit_code_for_error(ErrorCode::InternalIoError), 2);
    }

    #[test]
    fn error_envelope_carries_code_and_hints() {
        let err = Error::name_collision("sync", "github.com/x/sync");
        let json = CliResponse::<()>::from_error(&err).to_json().unwrap();

        assert!(json.contains("\"success\": false"));
        assert!(json.contains("\"code\": \"generate.name_collision\""));
        assert!(json.contains("\"hints\""));
    }

    #[test]
    fn success_envelope_has_no_error() {
        let json = CliResponse::success(serde_json::json!({ "path": "/out/user_loader_gen.go" }))
            .to_json()
            .unwrap();

        assert!(json.contains("\"success\": true"));
        assert!(json.contains("user_loader_gen.go"));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn rendered_error_lists_hints() {
        let err = Error::internal_io("No such file or directory", Some("/out/x.go".to_string()))
            .with_hint("Create the output directory before generating into it");

        assert_eq!(
            render_error(&err),
            "error: /out/x.go: No such file or directory\nhint: Create the output directory before generating into it"
        );
    }

    #[test]
    fn failed_result_maps_to_its_exit_code() {
        let result: Result<((), i32)> = Err(Error::render_failed("unresolved placeholder {{x}}"));
        assert_eq!(finish(result, false), 2);
        assert_eq!(finish(Ok(((), 0)), false), 0);
    }
}
