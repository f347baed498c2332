//! Resilience features for batch API interactions
//!
//! Provides bounded concurrency, rate-limit accounting and diagnostics for
//! operations that fan out many requests against the integration platform.

pub mod concurrency;
pub mod config;
pub mod diagnostics;
pub mod rate_limit;

pub use concurrency::{BoundedRunner, RunnerStats};
pub use config::{ConcurrencyConfig, MonitoringConfig, ResilienceConfig};
pub use diagnostics::{DiagnosticEvent, DiagnosticSink, LogSink, MemorySink, NoopSink};
pub use rate_limit::RateLimitCounter;
