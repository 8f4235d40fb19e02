mod blocking;
mod cli;
mod config;
mod inspect;
mod prepare;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = AppConfig::from_env()?;

    match cli.command {
        Command::PrepareData(args) => prepare::prepare_data(&cfg, args).await,
        Command::Fetch(args) => prepare::fetch(&cfg, args).await,
        Command::Extract(args) => prepare::extract(&cfg, args).await,
        Command::Inspect(args) => inspect::inspect(&cfg, args, cli.seed).await,
    }
}
