//! Command-line interface definition and dispatch

pub mod commands;
pub mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(
    name = "integration-cli",
    version,
    about = "Inspect integration packages, their artifacts and message processing logs"
)]
pub struct Cli {
    /// Log absorbed request failures and other diagnostics
    #[arg(long, global = true)]
    pub debug: bool,

    /// Tenant URL, e.g. https://tenant.it-cpi001.cfapps.eu10.hana.ondemand.com
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List packages with their flows, mappings and script collections
    Packages(PackagesArgs),
    /// List failed message processing logs of a flow
    Errors(ErrorLogArgs),
    /// Error types of a flow's failed logs, most frequent first
    ErrorStats(ErrorLogArgs),
    /// Duration statistics and outliers of a flow's logs
    Performance(PerformanceArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct PackagesArgs {
    /// Maximum number of packages to list
    #[arg(long)]
    pub top: Option<usize>,

    /// Number of packages to skip
    #[arg(long)]
    pub skip: Option<usize>,

    /// Also show packages without any artifacts
    #[arg(long)]
    pub include_empty: bool,

    /// Fetch all artifact kinds at once instead of package by package
    #[arg(long)]
    pub parallel: bool,

    /// Per-package requests in flight with --parallel
    #[arg(long)]
    pub concurrency: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ErrorLogArgs {
    /// Integration flow id
    pub flow: String,

    /// Look back this many hours
    #[arg(long, default_value_t = 24)]
    pub hours: i64,

    /// Maximum number of logs to retrieve
    #[arg(long, default_value_t = 50)]
    pub max: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct PerformanceArgs {
    /// Integration flow id
    pub flow: String,

    /// Look back this many days
    #[arg(long, default_value_t = 7)]
    pub days: i64,

    /// Maximum number of logs to retrieve
    #[arg(long, default_value_t = 100)]
    pub max: usize,

    /// Standard deviations from the mean that make a run an outlier
    #[arg(long, default_value_t = 2.0)]
    pub threshold: f64,

    /// Treat a missing start or end time as the epoch instead of skipping the log
    #[arg(long)]
    pub zero_fill_missing: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Run the parsed command against `config`
pub async fn run(cli: Cli, mut config: Config) -> Result<()> {
    if let Some(base_url) = cli.base_url {
        config.base_url = Some(base_url);
    }
    if cli.debug {
        config.debug = true;
        config.resilience.monitoring.diagnostics = true;
    }

    match cli.command {
        Commands::Packages(args) => commands::packages::handle_packages_command(args, &config).await,
        Commands::Errors(args) => commands::logs::handle_errors_command(args, &config).await,
        Commands::ErrorStats(args) => commands::logs::handle_error_stats_command(args, &config).await,
        Commands::Performance(args) => {
            commands::logs::handle_performance_command(args, &config).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packages_flags() {
        let cli = Cli::try_parse_from([
            "integration-cli",
            "packages",
            "--parallel",
            "--concurrency",
            "3",
            "--top",
            "20",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Packages(args) => {
                assert!(args.parallel);
                assert!(!args.include_empty);
                assert_eq!(args.concurrency, Some(3));
                assert_eq!(args.top, Some(20));
                assert_eq!(args.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_performance_defaults() {
        let cli = Cli::try_parse_from(["integration-cli", "--debug", "performance", "Orders"]).unwrap();
        assert!(cli.debug);
        match cli.command {
            Commands::Performance(args) => {
                assert_eq!(args.flow, "Orders");
                assert_eq!(args.days, 7);
                assert_eq!(args.max, 100);
                assert_eq!(args.threshold, 2.0);
                assert!(!args.zero_fill_missing);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_error_stats_subcommand_name() {
        let cli = Cli::try_parse_from(["integration-cli", "error-stats", "Orders", "--hours", "6"]).unwrap();
        assert!(matches!(cli.command, Commands::ErrorStats(ref args) if args.hours == 6));
    }
}
