// copyguard/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug copyguard run ... pour voir les détails
    // Les logs vont sur stderr : stdout reste exploitable (--format json).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            project_dir,
            records,
            output,
        } => commands::run::execute(project_dir, records, output).await,

        Commands::Validate {
            project_dir,
            record,
            content,
            fix,
            format,
        } => commands::validate::execute(project_dir, record, content, fix, format),

        Commands::Score {
            project_dir,
            record,
            content,
            format,
        } => commands::score::execute(project_dir, record, content, format),

        Commands::Facts {
            project_dir,
            records,
        } => commands::facts::execute(project_dir, records),
    }
}
