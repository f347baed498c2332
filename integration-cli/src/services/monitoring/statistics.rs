//! Statistics over message processing logs

use serde::Serialize;
use std::collections::HashMap;

use crate::api::constants::UNKNOWN_ERROR;
use crate::api::models::MessageProcessingLog;

/// Occurrences of one error type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorTypeCount {
    pub error_type: String,
    pub count: usize,
    /// Share of all logs, rounded to a whole percent
    pub percentage: u32,
}

/// Count logs per error type, most frequent first.
///
/// Logs without an error type are counted as "Unknown Error". Ties are ordered
/// by error type.
pub fn error_histogram(logs: &[MessageProcessingLog]) -> Vec<ErrorTypeCount> {
    if logs.is_empty() {
        return Vec::new();
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for log in logs {
        *counts.entry(log.error_type().unwrap_or(UNKNOWN_ERROR)).or_insert(0) += 1;
    }

    let total = logs.len() as f64;
    let mut histogram: Vec<ErrorTypeCount> = counts
        .into_iter()
        .map(|(error_type, count)| ErrorTypeCount {
            error_type: error_type.to_string(),
            count,
            percentage: (count as f64 / total * 100.0).round() as u32,
        })
        .collect();

    histogram.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.error_type.cmp(&b.error_type)));
    histogram
}

/// How to treat logs lacking a start or end time in duration analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingTimestampPolicy {
    /// Leave the log out of the statistics and count it as skipped
    #[default]
    Exclude,
    /// Treat the missing time as the Unix epoch, which yields huge or
    /// negative durations
    ZeroFill,
}

/// Duration of one log in milliseconds, per `policy`
pub fn log_duration_ms(log: &MessageProcessingLog, policy: MissingTimestampPolicy) -> Option<i64> {
    let start = log.log_start.map(|t| t.timestamp_millis());
    let end = log.log_end.map(|t| t.timestamp_millis());
    match policy {
        MissingTimestampPolicy::Exclude => Some(end? - start?),
        MissingTimestampPolicy::ZeroFill => Some(end.unwrap_or(0) - start.unwrap_or(0)),
    }
}

/// Summary statistics of log durations (milliseconds)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DurationStats {
    pub count: usize,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub min_ms: i64,
    pub max_ms: i64,
    /// Population standard deviation
    pub std_dev_ms: f64,
}

impl DurationStats {
    pub fn from_durations(durations: &[i64]) -> Self {
        if durations.is_empty() {
            return Self::default();
        }

        let n = durations.len() as f64;
        let mean = durations.iter().map(|&d| d as f64).sum::<f64>() / n;
        let variance = durations
            .iter()
            .map(|&d| (d as f64 - mean).powi(2))
            .sum::<f64>()
            / n;

        let mut sorted = durations.to_vec();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
        } else {
            sorted[mid] as f64
        };

        Self {
            count: durations.len(),
            mean_ms: mean,
            median_ms: median,
            min_ms: sorted[0],
            max_ms: sorted[sorted.len() - 1],
            std_dev_ms: variance.sqrt(),
        }
    }
}

/// A log whose duration is far from the mean
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationOutlier {
    pub log: MessageProcessingLog,
    pub duration_ms: i64,
    /// Distance from the mean in standard deviations
    pub deviations: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceAnalysis {
    pub stats: DurationStats,
    pub outliers: Vec<DurationOutlier>,
    pub outlier_threshold: f64,
    /// Logs left out for lacking a timestamp
    pub skipped_missing_timestamps: usize,
}

/// Duration statistics plus every log at least `threshold` standard
/// deviations away from the mean. With zero spread there are no outliers.
pub fn analyze_durations(
    logs: &[MessageProcessingLog],
    threshold: f64,
    policy: MissingTimestampPolicy,
) -> PerformanceAnalysis {
    let mut measured = Vec::with_capacity(logs.len());
    let mut skipped = 0;
    for log in logs {
        match log_duration_ms(log, policy) {
            Some(duration) => measured.push((log, duration)),
            None => skipped += 1,
        }
    }

    let durations: Vec<i64> = measured.iter().map(|(_, d)| *d).collect();
    let stats = DurationStats::from_durations(&durations);

    let outliers = if stats.std_dev_ms > 0.0 {
        measured
            .into_iter()
            .filter_map(|(log, duration)| {
                let deviations = (duration as f64 - stats.mean_ms).abs() / stats.std_dev_ms;
                (deviations >= threshold).then(|| DurationOutlier {
                    log: log.clone(),
                    duration_ms: duration,
                    deviations,
                })
            })
            .collect()
    } else {
        Vec::new()
    };

    PerformanceAnalysis {
        stats,
        outliers,
        outlier_threshold: threshold,
        skipped_missing_timestamps: skipped,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::api::models::{ErrorInformation, MessageProcessingLog};
    use chrono::{Duration, TimeZone, Utc};

    pub fn failed_log(guid: &str, error_type: Option<&str>) -> MessageProcessingLog {
        MessageProcessingLog {
            message_guid: guid.to_string(),
            status: Some("FAILED".to_string()),
            error_information: error_type.map(|t| ErrorInformation {
                error_type: Some(t.to_string()),
                message: None,
            }),
            ..Default::default()
        }
    }

    pub fn timed_log(guid: &str, duration_ms: i64) -> MessageProcessingLog {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        MessageProcessingLog {
            message_guid: guid.to_string(),
            status: Some("COMPLETED".to_string()),
            log_start: Some(start),
            log_end: Some(start + Duration::milliseconds(duration_ms)),
            ..Default::default()
        }
    }
}
