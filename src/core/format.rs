//! Post-processing of rendered loader source.
//!
//! `goimports` and `gofmt` are run as child processes with the source on
//! stdin. When neither is installed the builtin normalizer tidies whitespace,
//! sorts the import block and rejects text that is lexically broken.

use std::path::Path;

use crate::command::{self, find_program};
use crate::defaults::{FormatterKind, GOFMT_PROGRAM, GOIMPORTS_PROGRAM};
use crate::error::{Error, Result};
use crate::params::LoaderParams;
use crate::parser;

pub trait Formatter {
    fn name(&self) -> &str;

    /// Normalize `source`, which will be written to `path`.
    fn format(&self, path: &Path, source: &str) -> Result<String>;
}

/// Pick the formatter for `kind`, probing `PATH` when `kind` is `Auto`.
pub fn select(kind: FormatterKind) -> Box<dyn Formatter> {
    match kind {
        FormatterKind::Goimports => Box::new(ExternalFormatter::goimports()),
        FormatterKind::Gofmt => Box::new(ExternalFormatter::gofmt()),
        FormatterKind::Builtin => Box::new(BuiltinFormatter),
        FormatterKind::Auto => {
            if find_program(GOIMPORTS_PROGRAM).is_some() {
                Box::new(ExternalFormatter::goimports())
            } else if find_program(GOFMT_PROGRAM).is_some() {
                Box::new(ExternalFormatter::gofmt())
            } else {
                Box::new(BuiltinFormatter)
            }
        }
    }
}

/// A Go formatting tool reading source on stdin and writing the result to stdout.
#[derive(Debug, Clone)]
pub struct ExternalFormatter {
    program: &'static str,
    // goimports resolves imports relative to this directory
    pass_srcdir: bool,
}

impl ExternalFormatter {
    pub fn goimports() -> Self {
        Self {
            program: GOIMPORTS_PROGRAM,
            pass_srcdir: true,
        }
    }

    pub fn gofmt() -> Self {
        Self {
            program: GOFMT_PROGRAM,
            pass_srcdir: false,
        }
    }
}

impl Formatter for ExternalFormatter {
    fn name(&self) -> &str {
        self.program
    }

    fn format(&self, path: &Path, source: &str) -> Result<String> {
        let path_display = path.display().to_string();
        let program = find_program(self.program).ok_or_else(|| {
            Error::format_failed(
                &path_display,
                self.program,
                format!("{} not found on PATH", self.program),
            )
            .with_hint("Install the Go toolchain or pass --formatter builtin")
        })?;

        let mut args: Vec<String> = Vec::new();
        if self.pass_srcdir {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                args.push("-srcdir".to_string());
                args.push(dir.display().to_string());
            }
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        let output = command::run_with_stdin(&program, &arg_refs, source, "format generated code")
            .map_err(|e| Error::format_failed(&path_display, self.program, e.message))?;

        if !output.success {
            return Err(Error::format_failed(
                &path_display,
                self.program,
                output.error_text(),
            ));
        }

        Ok(output.stdout)
    }
}

/// In-process normalizer for machines without a Go toolchain.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinFormatter;

impl Formatter for BuiltinFormatter {
    fn name(&self) -> &str {
        "builtin"
    }

    fn format(&self, path: &Path, source: &str) -> Result<String> {
        if let Some(diagnostic) = validate(source) {
            return Err(Error::format_failed(
                path.display().to_string(),
                self.name(),
                diagnostic,
            ));
        }
        Ok(normalize(source))
    }
}

/// First key or value type of `params` that is not a Go type expression.
///
/// Runs before rendering so a malformed `--keys` never reaches any formatter.
pub fn check_loader_types(params: &LoaderParams) -> Option<String> {
    [("key", &params.key_type), ("value", &params.value_type)]
        .into_iter()
        .find_map(|(role, ty)| {
            parser::check_type_expression(ty)
                .map(|problem| format!("invalid {} type '{}': {}", role, ty, problem))
        })
}

/// Lexical sanity check; returns a `line:col: message` diagnostic on failure.
pub fn validate(source: &str) -> Option<String> {
    let masked = parser::mask_non_code(source);
    if let Some(at) = masked.unterminated {
        return Some(format!("{}: comment or literal not terminated", at));
    }

    check_package_clause(&masked.code).or_else(|| parser::check_brackets(&masked.code))
}

fn check_package_clause(code: &str) -> Option<String> {
    for (index, line) in code.lines().enumerate() {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            continue;
        };

        let line_no = index + 1;
        if first != "package" {
            return Some(format!("{}:1: expected 'package', found '{}'", line_no, first));
        }

        let rest: Vec<&str> = words.collect();
        return match rest.as_slice() {
            [name] if parser::is_identifier(name) => None,
            _ => Some(format!(
                "{}:1: invalid package name '{}'",
                line_no,
                rest.join(" ")
            )),
        };
    }

    Some("1:1: expected 'package', found EOF".to_string())
}

/// Whitespace and import-order normalization. Idempotent.
pub fn normalize(source: &str) -> String {
    let text = source.replace("\r\n", "\n");
    let lines: Vec<String> = text.lines().map(|l| l.trim_end().to_string()).collect();
    let lines = sort_import_block(lines);

    let mut out = String::with_capacity(text.len());
    let mut pending_blank = false;
    for line in lines {
        if line.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if pending_blank {
            out.push('\n');
            pending_blank = false;
        }
        out.push_str(&line);
        out.push('\n');
    }

    out
}

/// Rewrite the first `import ( ... )` block: deduplicated, standard library first, each group sorted.
fn sort_import_block(lines: Vec<String>) -> Vec<String> {
    let Some(start) = lines.iter().position(|l| l.trim() == "import (") else {
        return lines;
    };
    let Some(len) = lines[start + 1..].iter().position(|l| l.trim() == ")") else {
        return lines;
    };
    let end = start + 1 + len;

    let mut std_specs: Vec<String> = Vec::new();
    let mut other_specs: Vec<String> = Vec::new();
    for spec in lines[start + 1..end].iter().map(|l| l.trim()) {
        if spec.is_empty() {
            continue;
        }
        let group = if is_std_import(spec) {
            &mut std_specs
        } else {
            &mut other_specs
        };
        if !group.iter().any(|s| s == spec) {
            group.push(spec.to_string());
        }
    }
    std_specs.sort_by(|a, b| import_path(a).cmp(import_path(b)));
    other_specs.sort_by(|a, b| import_path(a).cmp(import_path(b)));

    let mut block = vec!["import (".to_string()];
    block.extend(std_specs.iter().map(|s| format!("\t{}", s)));
    if !std_specs.is_empty() && !other_specs.is_empty() {
        block.push(String::new());
    }
    block.extend(other_specs.iter().map(|s| format!("\t{}", s)));
    block.push(")".to_string());

    let mut out = lines[..start].to_vec();
    out.extend(block);
    out.extend_from_slice(&lines[end + 1..]);
    out
}

fn import_path(spec: &str) -> &str {
    spec.split('"').nth(1).unwrap_or(spec)
}

// Standard library paths have no dot in their first element
fn is_std_import(spec: &str) -> bool {
    let path = import_path(spec);
    !path.split('/').next().unwrap_or(path).contains('.')
}
