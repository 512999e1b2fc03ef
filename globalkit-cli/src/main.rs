//! globalkit binary entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use globalkit::commands::{self, FAILURE_EXIT_CODE};
use globalkit::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("globalkit=debug,globalkit_fields=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout();
    let exit_code = match commands::run(cli, &mut stdout).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            FAILURE_EXIT_CODE
        }
    };
    std::process::exit(exit_code);
}
