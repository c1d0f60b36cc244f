use clap::Parser;
use gantry::{run, Cli};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "gantry=debug"
    } else {
        "gantry=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    match run::execute(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Assessment aborted");
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}
