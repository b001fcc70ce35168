mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Diff { desired, observed } => {
            commands::diff(desired, observed, cli.config, cli.json).await
        }
        Command::Sync {
            desired,
            observed,
            max_passes,
        } => commands::sync(desired, observed, max_passes, cli.config, cli.json).await,
        Command::Tree {
            snapshot,
            tenant,
            operational,
        } => commands::tree(snapshot, tenant, operational, cli.json).await,
    }
}
