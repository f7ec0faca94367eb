//! Segloader CLI - Command-line interface
//!
//! Downloads numbered chunk files and stitches them into one output file,
//! either for a single resource (`get`) or for a JSON batch (`batch`).

mod commands;
mod error;
mod logging;
mod progress;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::batch::BatchArgs;
use commands::common::SettingsArgs;
use commands::get::GetArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "segloader", version, about = "Download chunked resources into a single file")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Download a single resource
    Get(GetArgs),
    /// Download every resource listed in a JSON batch file
    Batch(BatchArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match logging::init(cli.verbose, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    let settings = cli.settings.resolve()?;

    runtime.block_on(async move {
        match cli.command {
            Commands::Get(args) => commands::get::run(args, &settings).await,
            Commands::Batch(args) => commands::batch::run(args, &settings).await,
        }
    })
}
