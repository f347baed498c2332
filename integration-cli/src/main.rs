use anyhow::Result;
use clap::Parser;
use colored::*;

use integration_cli::cli::{self, Cli};
use integration_cli::config::Config;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Cli::parse();
    let config = Config::load()?;

    let default_level = if args.debug || config.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();

    cli::run(args, config).await
}
