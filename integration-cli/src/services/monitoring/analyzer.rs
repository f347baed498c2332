//! Flow-scoped log searches and analyses

use anyhow::{Context, Result, ensure};
use chrono::{DateTime, Duration, Utc};
use log::debug;
use std::sync::Arc;

use super::statistics::{
    ErrorTypeCount, MissingTimestampPolicy, PerformanceAnalysis, analyze_durations,
    error_histogram,
};
use crate::api::constants::STATUS_FAILED;
use crate::api::models::MessageProcessingLog;
use crate::api::query::{Filter, OrderBy, Query};
use crate::api::source::MessageLogSource;

/// Window and size for error log searches
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorLogOptions {
    /// Defaults to 24 hours before `to_date`
    pub from_date: Option<DateTime<Utc>>,
    /// Defaults to now
    pub to_date: Option<DateTime<Utc>>,
    pub max_results: usize,
}

impl Default for ErrorLogOptions {
    fn default() -> Self {
        Self {
            from_date: None,
            to_date: None,
            max_results: 50,
        }
    }
}

/// Window, size and outlier rule for performance analysis
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceOptions {
    /// Defaults to 7 days before `to_date`
    pub from_date: Option<DateTime<Utc>>,
    /// Defaults to now
    pub to_date: Option<DateTime<Utc>>,
    pub max_results: usize,
    /// Standard deviations from the mean that make a log an outlier
    pub outlier_threshold: f64,
    pub missing_timestamps: MissingTimestampPolicy,
}

impl Default for PerformanceOptions {
    fn default() -> Self {
        Self {
            from_date: None,
            to_date: None,
            max_results: 100,
            outlier_threshold: 2.0,
            missing_timestamps: MissingTimestampPolicy::default(),
        }
    }
}

fn resolve_window(
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    lookback: Duration,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let to = to.unwrap_or_else(Utc::now);
    let from = from.unwrap_or(to - lookback);
    (from, to)
}

fn window_filter(flow_id: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<Filter> {
    vec![
        Filter::eq("IntegrationFlowName", flow_id),
        Filter::ge("LogEnd", from),
        Filter::le("LogEnd", to),
    ]
}

/// Build the query for failed logs of `flow_id`
pub fn error_log_query(flow_id: &str, options: &ErrorLogOptions) -> Query {
    let (from, to) = resolve_window(options.from_date, options.to_date, Duration::hours(24));
    let mut conditions = window_filter(flow_id, from, to);
    conditions.insert(1, Filter::eq("Status", STATUS_FAILED));

    Query::new()
        .filter(Filter::and(conditions))
        .orderby(OrderBy::desc("LogEnd"))
        .top(options.max_results)
}

/// Build the query for all logs of `flow_id` in the performance window
pub fn performance_query(flow_id: &str, options: &PerformanceOptions) -> Query {
    let (from, to) = resolve_window(options.from_date, options.to_date, Duration::days(7));

    Query::new()
        .filter(Filter::and(window_filter(flow_id, from, to)))
        .orderby(OrderBy::desc("LogEnd"))
        .top(options.max_results)
}

/// Read-only analyses of one flow's message processing logs
pub struct FlowLogAnalyzer {
    logs: Arc<dyn MessageLogSource>,
}

impl FlowLogAnalyzer {
    pub fn new(logs: Arc<dyn MessageLogSource>) -> Self {
        Self { logs }
    }

    /// Failed logs of `flow_id`, newest first
    pub async fn find_error_logs_for_flow(
        &self,
        flow_id: &str,
        options: &ErrorLogOptions,
    ) -> Result<Vec<MessageProcessingLog>> {
        ensure!(!flow_id.trim().is_empty(), "flow id must not be empty");
        let query = error_log_query(flow_id, options);
        debug!("Searching failed logs for {} (top {})", flow_id, options.max_results);

        self.logs
            .list_message_logs(&query)
            .await
            .with_context(|| format!("Failed to list error logs for flow {}", flow_id))
    }

    /// Error types of the failed logs of `flow_id`, most frequent first
    pub async fn get_error_statistics_for_flow(
        &self,
        flow_id: &str,
        options: &ErrorLogOptions,
    ) -> Result<Vec<ErrorTypeCount>> {
        let logs = self.find_error_logs_for_flow(flow_id, options).await?;
        Ok(error_histogram(&logs))
    }

    /// Duration statistics and outliers for `flow_id`
    pub async fn analyze_flow_performance(
        &self,
        flow_id: &str,
        options: &PerformanceOptions,
    ) -> Result<PerformanceAnalysis> {
        ensure!(!flow_id.trim().is_empty(), "flow id must not be empty");
        ensure!(
            options.outlier_threshold.is_finite() && options.outlier_threshold >= 0.0,
            "outlier threshold must be a non-negative number"
        );
        let query = performance_query(flow_id, options);

        let logs = self
            .logs
            .list_message_logs(&query)
            .await
            .with_context(|| format!("Failed to list logs for flow {}", flow_id))?;

        let analysis = analyze_durations(&logs, options.outlier_threshold, options.missing_timestamps);
        if analysis.skipped_missing_timestamps > 0 {
            debug!(
                "{}: {} logs without start or end time left out",
                flow_id, analysis.skipped_missing_timestamps
            );
        }
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::monitoring::statistics::fixtures::{failed_log, timed_log};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    struct MockLogSource {
        logs: Vec<MessageProcessingLog>,
        queries: Mutex<Vec<Query>>,
    }

    impl MockLogSource {
        fn new(logs: Vec<MessageProcessingLog>) -> Arc<Self> {
            Arc::new(Self {
                logs,
                queries: Mutex::new(Vec::new()),
            })
        }

        fn last_query(&self) -> Query {
            self.queries.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl MessageLogSource for MockLogSource {
        async fn list_message_logs(&self, query: &Query) -> Result<Vec<MessageProcessingLog>> {
            self.queries.lock().unwrap().push(query.clone());
            let top = query.top.unwrap_or(usize::MAX);
            Ok(self.logs.iter().take(top).cloned().collect())
        }
    }

    #[test]
    fn test_error_query_shape() {
        let to = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();
        let options = ErrorLogOptions {
            to_date: Some(to),
            ..Default::default()
        };

        let query = error_log_query("Orders_Flow", &options);
        assert_eq!(query.top, Some(50));
        assert_eq!(
            query.filter.unwrap().to_odata_string(),
            "IntegrationFlowName eq 'Orders_Flow' and Status eq 'FAILED' and \
             LogEnd ge datetime'2024-06-01T00:00:00' and LogEnd le datetime'2024-06-02T00:00:00'"
        );
        assert_eq!(query.orderby, vec![OrderBy::desc("LogEnd")]);
    }

    #[test]
    fn test_performance_query_defaults_to_seven_days() {
        let to = Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap();
        let options = PerformanceOptions {
            to_date: Some(to),
            ..Default::default()
        };

        let query = performance_query("Orders_Flow", &options);
        assert_eq!(query.top, Some(100));
        let filter = query.filter.unwrap().to_odata_string();
        assert!(filter.contains("LogEnd ge datetime'2024-06-01T00:00:00'"));
        assert!(!filter.contains("Status"));
    }

    #[tokio::test]
    async fn test_error_statistics() {
        let source = MockLogSource::new(vec![
            failed_log("1", Some("A")),
            failed_log("2", Some("B")),
            failed_log("3", Some("A")),
        ]);
        let analyzer = FlowLogAnalyzer::new(source.clone());

        let stats = analyzer
            .get_error_statistics_for_flow("Orders_Flow", &ErrorLogOptions::default())
            .await
            .unwrap();

        assert_eq!(stats[0].error_type, "A");
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].percentage, 67);
        assert_eq!(stats[1].percentage, 33);
        assert_eq!(source.last_query().top, Some(50));
    }

    #[tokio::test]
    async fn test_max_results_caps_logs() {
        let logs = (0..10).map(|i| failed_log(&i.to_string(), None)).collect();
        let analyzer = FlowLogAnalyzer::new(MockLogSource::new(logs));

        let options = ErrorLogOptions {
            max_results: 4,
            ..Default::default()
        };
        let found = analyzer
            .find_error_logs_for_flow("Orders_Flow", &options)
            .await
            .unwrap();
        assert_eq!(found.len(), 4);
    }

    #[tokio::test]
    async fn test_flow_performance() {
        let logs = [10, 10, 10, 10, 1000]
            .iter()
            .enumerate()
            .map(|(i, &d)| timed_log(&i.to_string(), d))
            .collect();
        let analyzer = FlowLogAnalyzer::new(MockLogSource::new(logs));

        let analysis = analyzer
            .analyze_flow_performance("Orders_Flow", &PerformanceOptions::default())
            .await
            .unwrap();

        assert_eq!(analysis.outliers.len(), 1);
        assert_eq!(analysis.outliers[0].duration_ms, 1000);
        assert_eq!(analysis.outlier_threshold, 2.0);
    }

    #[tokio::test]
    async fn test_empty_flow_id_rejected() {
        let analyzer = FlowLogAnalyzer::new(MockLogSource::new(Vec::new()));
        assert!(
            analyzer
                .find_error_logs_for_flow("  ", &ErrorLogOptions::default())
                .await
                .is_err()
        );
    }
}
