//! The generation pipeline: build parameters, render, format, write.

use serde::Serialize;
use std::path::PathBuf;

use crate::defaults::GENERATED_FILE_EXTENSION;
use crate::error::{Error, Result};
use crate::format::{self, Formatter};
use crate::io;
use crate::loader_template;
use crate::module::{GoModResolver, ModuleResolver};
use crate::params::{self, GenerateRequest, LoaderParams};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOutput {
    pub path: PathBuf,
    pub formatter: String,
    pub loader: LoaderParams,
}

/// Generate a loader using `go.mod` resolution and the requested formatter.
pub fn generate(request: &GenerateRequest) -> Result<GenerateOutput> {
    let formatter = format::select(request.formatter);
    generate_with(request, &GoModResolver::new(), formatter.as_ref())
}

/// Run the pipeline with explicit collaborators. The first failing stage
/// aborts the run; nothing is written unless formatting succeeded.
pub fn generate_with(
    request: &GenerateRequest,
    resolver: &dyn ModuleResolver,
    formatter: &dyn Formatter,
) -> Result<GenerateOutput> {
    let loader = params::build(request, resolver)?;
    let path = request
        .output_dir
        .join(loader.file_name(GENERATED_FILE_EXTENSION));

    if let Some(problem) = format::check_loader_types(&loader) {
        return Err(Error::format_failed(
            path.display().to_string(),
            formatter.name(),
            problem,
        ));
    }

    let rendered = loader_template::render(&loader)?;

    log_status!("generate", "Formatting with {}", formatter.name());
    let formatted = formatter.format(&path, &rendered)?;

    io::write_file(&path, &formatted, "writing output")?;
    log_status!("generate", "Wrote {} to {}", loader.loader_name, path.display());

    Ok(GenerateOutput {
        path,
        formatter: formatter.name().to_string(),
        loader,
    })
}
