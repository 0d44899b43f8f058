use clap::Parser;

mod commands;
mod output;

use commands::generate;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "dataloaden")]
#[command(version = VERSION)]
#[command(about = "Generate type-specialized batching data loaders for Go")]
struct Cli {
    #[command(flatten)]
    args: generate::GenerateArgs,
}

fn main() -> std::process::ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are reported through clap as well
            let exit_code = if e.use_stderr() {
                output::USAGE_EXIT_CODE
            } else {
                0
            };
            return std::process::ExitCode::from(exit_code_to_u8(exit_code));
        }
    };

    let exit_code = output::finish(generate::run(&cli.args), cli.args.json);
    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
