//! `packages` command

use anyhow::{Context, Result};
use colored::*;
use std::time::Instant;

use super::{build_client, diagnostics_sink};
use crate::cli::output::{render_table, to_json};
use crate::cli::{OutputFormat, PackagesArgs};
use crate::config::Config;
use crate::services::artifacts::{AggregationOptions, ArtifactAggregator, PackageWithArtifacts};

pub async fn handle_packages_command(args: PackagesArgs, config: &Config) -> Result<()> {
    let client = build_client(config)?;
    let aggregator = ArtifactAggregator::new(client).with_diagnostics(diagnostics_sink(config));

    let options = AggregationOptions {
        top: args.top,
        skip: args.skip,
        include_empty: args.include_empty,
        parallel: args.parallel,
        concurrency: args
            .concurrency
            .unwrap_or(config.resilience.concurrency.max_concurrent_requests),
    };

    let start = Instant::now();
    let report = aggregator
        .aggregate(&options)
        .await
        .context("Failed to collect packages with artifacts")?;
    log::debug!("Aggregation took {:.2}s", start.elapsed().as_secs_f64());

    match args.format {
        OutputFormat::Json => println!("{}", to_json(&report.packages)?),
        OutputFormat::Table => {
            if report.packages.is_empty() {
                println!("{}", "No packages found".dimmed());
            } else {
                println!("{}", render_packages(&report.packages));
            }
        }
    }

    if report.rate_limit_errors > 0 {
        eprintln!(
            "{} {} requests were rate limited; affected packages may be missing artifacts",
            "warning:".yellow().bold(),
            report.rate_limit_errors
        );
    }

    Ok(())
}

fn render_packages(packages: &[PackageWithArtifacts]) -> String {
    let rows: Vec<Vec<String>> = packages
        .iter()
        .map(|entry| {
            let a = &entry.artifacts;
            vec![
                entry.package.id.clone(),
                entry.package.name.clone(),
                a.integration_flows.len().to_string(),
                a.message_mappings.len().to_string(),
                a.value_mappings.len().to_string(),
                a.script_collections.len().to_string(),
                a.total().to_string(),
            ]
        })
        .collect();

    render_table(
        &["Id", "Name", "Flows", "Msg Maps", "Value Maps", "Scripts", "Total"],
        &rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::IntegrationPackage;
    use crate::services::artifacts::PackageArtifacts;
    use crate::services::artifacts::testing::flow;

    #[test]
    fn test_render_packages() {
        let packages = vec![PackageWithArtifacts {
            package: IntegrationPackage {
                id: "Orders".into(),
                name: "Order Handling".into(),
                ..Default::default()
            },
            artifacts: PackageArtifacts {
                integration_flows: vec![flow("F1", Some("Orders")), flow("F2", Some("Orders"))],
                ..Default::default()
            },
        }];

        let table = render_packages(&packages);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Id"));
        assert!(lines[2].starts_with("Orders  Order Handling  2"));
    }
}
