//! `errors`, `error-stats` and `performance` commands

use anyhow::{Context, Result, ensure};
use chrono::{DateTime, Duration, Utc};
use colored::*;

use super::build_client;
use crate::api::constants::UNKNOWN_ERROR;
use crate::api::models::MessageProcessingLog;
use crate::cli::output::{format_duration_ms, format_timestamp, render_table, to_json};
use crate::cli::{ErrorLogArgs, OutputFormat, PerformanceArgs};
use crate::config::Config;
use crate::services::monitoring::{
    ErrorLogOptions, ErrorTypeCount, FlowLogAnalyzer, MissingTimestampPolicy, PerformanceAnalysis,
    PerformanceOptions,
};

/// `[now - span, now]`; fails instead of overflowing on absurd spans
fn lookback(span: Option<Duration>, flag: &str) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let now = Utc::now();
    let from = span
        .and_then(|span| now.checked_sub_signed(span))
        .with_context(|| format!("{} reaches too far into the past", flag))?;
    Ok((from, now))
}

fn error_log_options(args: &ErrorLogArgs) -> Result<ErrorLogOptions> {
    ensure!(args.hours > 0, "--hours must be positive");
    let (from, to) = lookback(Duration::try_hours(args.hours), "--hours")?;
    Ok(ErrorLogOptions {
        from_date: Some(from),
        to_date: Some(to),
        max_results: args.max,
    })
}

fn performance_options(args: &PerformanceArgs) -> Result<PerformanceOptions> {
    ensure!(args.days > 0, "--days must be positive");
    let (from, to) = lookback(Duration::try_days(args.days), "--days")?;
    Ok(PerformanceOptions {
        from_date: Some(from),
        to_date: Some(to),
        max_results: args.max,
        outlier_threshold: args.threshold,
        missing_timestamps: if args.zero_fill_missing {
            MissingTimestampPolicy::ZeroFill
        } else {
            MissingTimestampPolicy::Exclude
        },
    })
}

pub async fn handle_errors_command(args: ErrorLogArgs, config: &Config) -> Result<()> {
    let options = error_log_options(&args)?;
    let analyzer = FlowLogAnalyzer::new(build_client(config)?);

    let logs = analyzer.find_error_logs_for_flow(&args.flow, &options).await?;

    match args.format {
        OutputFormat::Json => println!("{}", to_json(&logs)?),
        OutputFormat::Table if logs.is_empty() => {
            println!("{}", format!("No failed logs for {} in the last {}h", args.flow, args.hours).dimmed());
        }
        OutputFormat::Table => println!("{}", render_error_logs(&logs)),
    }
    Ok(())
}

pub async fn handle_error_stats_command(args: ErrorLogArgs, config: &Config) -> Result<()> {
    let options = error_log_options(&args)?;
    let analyzer = FlowLogAnalyzer::new(build_client(config)?);

    let stats = analyzer
        .get_error_statistics_for_flow(&args.flow, &options)
        .await?;

    match args.format {
        OutputFormat::Json => println!("{}", to_json(&stats)?),
        OutputFormat::Table if stats.is_empty() => {
            println!("{}", format!("No failed logs for {} in the last {}h", args.flow, args.hours).dimmed());
        }
        OutputFormat::Table => println!("{}", render_error_stats(&stats)),
    }
    Ok(())
}

pub async fn handle_performance_command(args: PerformanceArgs, config: &Config) -> Result<()> {
    let options = performance_options(&args)?;
    let analyzer = FlowLogAnalyzer::new(build_client(config)?);

    let analysis = analyzer
        .analyze_flow_performance(&args.flow, &options)
        .await?;

    match args.format {
        OutputFormat::Json => println!("{}", to_json(&analysis)?),
        OutputFormat::Table => println!("{}", render_performance(&args.flow, &analysis)),
    }
    Ok(())
}

fn render_error_logs(logs: &[MessageProcessingLog]) -> String {
    let rows: Vec<Vec<String>> = logs
        .iter()
        .map(|log| {
            vec![
                log.message_guid.clone(),
                format_timestamp(log.log_end),
                log.error_type().unwrap_or(UNKNOWN_ERROR).to_string(),
            ]
        })
        .collect();
    render_table(&["Message", "Ended", "Error Type"], &rows)
}

fn render_error_stats(stats: &[ErrorTypeCount]) -> String {
    let rows: Vec<Vec<String>> = stats
        .iter()
        .map(|s| vec![s.error_type.clone(), s.count.to_string(), format!("{}%", s.percentage)])
        .collect();
    render_table(&["Error Type", "Count", "Share"], &rows)
}

fn render_performance(flow: &str, analysis: &PerformanceAnalysis) -> String {
    let stats = &analysis.stats;
    let mut out = vec![
        format!("{} ({} runs)", flow.bold(), stats.count),
        format!("  mean    {}", format_duration_ms(stats.mean_ms)),
        format!("  median  {}", format_duration_ms(stats.median_ms)),
        format!("  min     {}", format_duration_ms(stats.min_ms as f64)),
        format!("  max     {}", format_duration_ms(stats.max_ms as f64)),
        format!("  stddev  {}", format_duration_ms(stats.std_dev_ms)),
    ];

    if analysis.skipped_missing_timestamps > 0 {
        out.push(
            format!(
                "  {} runs without start or end time were skipped",
                analysis.skipped_missing_timestamps
            )
            .dimmed()
            .to_string(),
        );
    }

    if analysis.outliers.is_empty() {
        out.push(format!(
            "No outliers beyond {} standard deviations",
            analysis.outlier_threshold
        ));
    } else {
        out.push(String::new());
        let rows: Vec<Vec<String>> = analysis
            .outliers
            .iter()
            .map(|o| {
                vec![
                    o.log.message_guid.clone(),
                    format_timestamp(o.log.log_start),
                    format_duration_ms(o.duration_ms as f64),
                    format!("{:.1}σ", o.deviations),
                ]
            })
            .collect();
        out.push(render_table(&["Message", "Started", "Duration", "Deviation"], &rows));
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::monitoring::statistics::fixtures::failed_log;

    #[test]
    fn test_render_error_logs_labels_unknown() {
        let table = render_error_logs(&[failed_log("m-1", None)]);
        assert!(table.lines().last().unwrap().ends_with("Unknown Error"));
    }

    #[test]
    fn test_render_error_stats() {
        let table = render_error_stats(&[ErrorTypeCount {
            error_type: "HTTP_500".into(),
            count: 3,
            percentage: 75,
        }]);
        assert!(table.contains("75%"));
    }

    #[test]
    fn test_rejects_non_positive_window() {
        let args = ErrorLogArgs {
            flow: "Orders".into(),
            hours: 0,
            max: 10,
            format: OutputFormat::Table,
        };
        assert!(error_log_options(&args).is_err());
    }

    #[test]
    fn test_oversized_window_is_an_error() {
        let args = ErrorLogArgs {
            flow: "Orders".into(),
            hours: i64::MAX / 1000,
            max: 10,
            format: OutputFormat::Table,
        };
        let err = error_log_options(&args).unwrap_err();
        assert!(err.to_string().contains("--hours"));

        let args = PerformanceArgs {
            flow: "Orders".into(),
            days: i64::MAX / 1000,
            max: 100,
            threshold: 2.0,
            zero_fill_missing: false,
            format: OutputFormat::Table,
        };
        assert!(performance_options(&args).is_err());
    }

    #[test]
    fn test_window_ends_now() {
        let args = ErrorLogArgs {
            flow: "Orders".into(),
            hours: 6,
            max: 10,
            format: OutputFormat::Table,
        };
        let options = error_log_options(&args).unwrap();
        let (from, to) = (options.from_date.unwrap(), options.to_date.unwrap());
        assert_eq!(to - from, Duration::hours(6));
    }
}
