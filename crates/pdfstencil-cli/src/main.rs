mod check_function_cmd;
mod cli;
mod run_cmd;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        cli::Commands::Run {
            ref template,
            ref config,
            ref document,
            ref functions,
            format,
            ref output,
        } => run_cmd::run(
            template,
            config,
            document,
            functions.as_deref(),
            format,
            output.as_deref(),
        ),
        cli::Commands::CheckFunction { ref file } => check_function_cmd::run(file),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
