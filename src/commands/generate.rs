use clap::Args;
use std::path::{Path, PathBuf};

use dataloaden::defaults::{FormatterKind, DEFAULT_FORMATTER, DEFAULT_KEY_TYPE};
use dataloaden::{Error, GenerateOutput, GenerateRequest};

use super::CmdResult;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Type to load, as `import/path.Name` (e.g. github.com/x/proj/models.User)
    #[arg(value_name = "TYPE")]
    pub type_ref: String,

    /// Go type of the lookup keys
    #[arg(long, value_name = "TYPE", default_value = DEFAULT_KEY_TYPE)]
    pub keys: String,

    /// Generate a loader that returns a slice of values per key
    #[arg(long)]
    pub slice: bool,

    /// Directory to write the loader into (defaults to the working directory)
    #[arg(long, value_name = "DIR")]
    pub dir: Option<String>,

    /// Post-processor for the generated source: auto, goimports, gofmt or builtin
    #[arg(long, value_name = "NAME", default_value = DEFAULT_FORMATTER)]
    pub formatter: String,

    /// Print a JSON summary of the generated loader to stdout
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: &GenerateArgs) -> CmdResult<GenerateOutput> {
    let cwd = std::env::current_dir().map_err(|e| {
        Error::internal_io(e.to_string(), Some("read working directory".to_string()))
    })?;

    let request = build_request(args, &cwd)?;
    let output = dataloaden::generate(&request)?;

    Ok((output, 0))
}

/// Turn CLI arguments into a request with every path made absolute against `cwd`.
pub(crate) fn build_request(args: &GenerateArgs, cwd: &Path) -> dataloaden::Result<GenerateRequest> {
    if args.type_ref.trim().is_empty() {
        return Err(Error::validation_missing_argument(vec!["TYPE".to_string()]));
    }
    let formatter: FormatterKind = args.formatter.parse()?;

    Ok(GenerateRequest {
        type_ref: args.type_ref.clone(),
        key_type: args.keys.clone(),
        slice: args.slice,
        output_dir: resolve_output_dir(args.dir.as_deref(), cwd),
        invoking_dir: cwd.to_path_buf(),
        formatter,
    })
}

fn resolve_output_dir(dir: Option<&str>, cwd: &Path) -> PathBuf {
    match dir.filter(|d| !d.is_empty()) {
        // joining an absolute path replaces cwd
        Some(dir) => cwd.join(dir),
        None => cwd.to_path_buf(),
    }
}
