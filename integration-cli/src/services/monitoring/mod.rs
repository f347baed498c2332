// Message processing log analysis
//
// Flow-scoped searches over the paginated log source, plus pure statistics
// (error-type histogram, duration outliers) computed on the results.

pub mod analyzer;
pub mod statistics;

pub use analyzer::{ErrorLogOptions, FlowLogAnalyzer, PerformanceOptions};
pub use statistics::{
    DurationOutlier, DurationStats, ErrorTypeCount, MissingTimestampPolicy, PerformanceAnalysis,
    analyze_durations, error_histogram,
};
