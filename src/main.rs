use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use faturamento::cli::Cli;
use faturamento::dispatcher;

fn main() -> Result<()> {
    // Logs go to stderr so tables and JSON on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    dispatcher::dispatch(cli)
}
