//! Go package resolution.
//!
//! The invoking package is identified from the nearest `go.mod` above the
//! working directory plus the package clause of the Go files in it. The output
//! package name is read straight off the output directory path.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::naming::last_path_segment;
use crate::parser::mask_non_code;

static MODULE_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    // `module example.com/app` or `module "example.com/app"`
    Regex::new(r#"(?m)^\s*module\s+"?([^\s"/]+(?:/[^\s"]+)*)"?\s*(?://.*)?$"#).unwrap()
});

static PACKAGE_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*package\s+([\p{L}_][\p{L}\p{N}_]*)").unwrap());

/// Identity of a Go package: import path and declared name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleIdentity {
    pub path: String,
    pub name: String,
}

/// Resolves package context for the parameter builder.
pub trait ModuleResolver {
    /// Identity of the package rooted at `dir`.
    fn resolve_invoking_module(&self, dir: &Path) -> Result<ModuleIdentity>;

    /// Package name the generated file declares when written to `output_dir`.
    fn derive_output_module_name(&self, output_dir: &Path) -> Result<String> {
        output_package_name(output_dir)
    }
}

/// Filesystem resolver backed by `go.mod` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoModResolver;

impl GoModResolver {
    pub fn new() -> Self {
        Self
    }
}

impl ModuleResolver for GoModResolver {
    fn resolve_invoking_module(&self, dir: &Path) -> Result<ModuleIdentity> {
        let dir_display = dir.display().to_string();
        let dir = fs::canonicalize(dir).map_err(|e| {
            Error::module_resolution_failed(
                dir_display.clone(),
                format!("unable to find package info: {}", e),
            )
        })?;

        let (mod_root, module_path) = find_go_mod(&dir)?.ok_or_else(|| {
            Error::module_resolution_failed(
                dir_display.clone(),
                "unable to find package info: no go.mod in this directory or any parent",
            )
            .with_hint("Run dataloaden from inside a Go module (a directory tree with a go.mod)")
        })?;

        let path = package_path(&module_path, &mod_root, &dir);

        let mut names = package_names(&dir)?;
        let name = match names.len() {
            0 => last_path_segment(&path).to_string(),
            1 => names.pop_first().unwrap_or_default(),
            _ => {
                return Err(Error::module_resolution_ambiguous(
                    dir_display,
                    "found more than one package in directory",
                    names.into_iter().collect(),
                ))
            }
        };

        Ok(ModuleIdentity { path, name })
    }
}

/// Last normal component of `output_dir`.
pub fn output_package_name(output_dir: &Path) -> Result<String> {
    match output_dir.components().next_back() {
        Some(Component::Normal(segment)) => Ok(segment.to_string_lossy().to_string()),
        _ => Err(Error::module_resolution_failed(
            output_dir.display().to_string(),
            "unable to generate loader package name from output directory",
        )
        .with_hint("Pass --dir pointing at the package directory the loader belongs to")),
    }
}

/// Walk up from `dir` to the nearest `go.mod`, returning its directory and module path.
fn find_go_mod(dir: &Path) -> Result<Option<(PathBuf, String)>> {
    for candidate in dir.ancestors() {
        let go_mod = candidate.join("go.mod");
        if !go_mod.is_file() {
            continue;
        }

        let content = fs::read_to_string(&go_mod).map_err(|e| {
            Error::module_resolution_failed(
                go_mod.display().to_string(),
                format!("unable to read go.mod: {}", e),
            )
        })?;

        let module_path = parse_module_directive(&content).ok_or_else(|| {
            Error::module_resolution_failed(
                go_mod.display().to_string(),
                "go.mod has no module directive",
            )
        })?;

        return Ok(Some((candidate.to_path_buf(), module_path)));
    }

    Ok(None)
}

pub(crate) fn parse_module_directive(go_mod: &str) -> Option<String> {
    MODULE_DIRECTIVE
        .captures(go_mod)
        .map(|caps| caps[1].to_string())
}

fn package_path(module_path: &str, mod_root: &Path, dir: &Path) -> String {
    let rel: Vec<String> = dir
        .strip_prefix(mod_root)
        .map(|rel| {
            rel.components()
                .filter_map(|c| match c {
                    Component::Normal(s) => Some(s.to_string_lossy().to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    if rel.is_empty() {
        module_path.to_string()
    } else {
        format!("{}/{}", module_path, rel.join("/"))
    }
}

/// Distinct package clauses of the buildable Go files directly in `dir`.
fn package_names(dir: &Path) -> Result<BTreeSet<String>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        Error::module_resolution_failed(
            dir.display().to_string(),
            format!("unable to list directory: {}", e),
        )
    })?;

    let mut names = BTreeSet::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || !is_buildable_go_file(&path) {
            continue;
        }

        let source = fs::read_to_string(&path).map_err(|e| {
            Error::module_resolution_failed(
                path.display().to_string(),
                format!("unable to read Go source: {}", e),
            )
        })?;
        if let Some(name) = package_clause(&source) {
            names.insert(name);
        }
    }

    Ok(names)
}

fn is_buildable_go_file(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    file_name.ends_with(".go")
        && !file_name.ends_with("_test.go")
        && !file_name.starts_with('_')
        && !file_name.starts_with('.')
}

// Build tags and license headers precede the package clause as comments
pub(crate) fn package_clause(source: &str) -> Option<String> {
    let masked = mask_non_code(source);
    PACKAGE_CLAUSE
        .captures(&masked.code)
        .map(|caps| caps[1].to_string())
}
