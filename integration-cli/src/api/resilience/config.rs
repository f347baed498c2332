//! Resilience configuration with builder pattern
//!
//! Concurrency, timeout and diagnostics settings for batch operations,
//! with sane defaults.

use std::time::Duration;

/// Settings shared by the HTTP client and the batch layer
#[derive(Debug, Clone, PartialEq)]
pub struct ResilienceConfig {
    pub concurrency: ConcurrencyConfig,
    pub monitoring: MonitoringConfig,
    /// Per-request timeout handed to the HTTP transport
    pub request_timeout: Duration,
}

/// Fan-out concurrency settings
#[derive(Debug, Clone, PartialEq)]
pub struct ConcurrencyConfig {
    /// Per-package requests in flight during parallel aggregation
    pub max_concurrent_requests: usize,
}

/// Diagnostics settings
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoringConfig {
    /// Route absorbed failures to the log instead of dropping them
    pub diagnostics: bool,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            concurrency: ConcurrencyConfig::default(),
            monitoring: MonitoringConfig::default(),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 7,
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self { diagnostics: false }
    }
}

impl ResilienceConfig {
    pub fn builder() -> ResilienceConfigBuilder {
        ResilienceConfigBuilder::new()
    }

    /// Low concurrency for tenants that throttle aggressively
    pub fn conservative() -> Self {
        Self {
            concurrency: ConcurrencyConfig {
                max_concurrent_requests: 3,
            },
            monitoring: MonitoringConfig { diagnostics: true },
            request_timeout: Duration::from_secs(120),
        }
    }

    /// Verbose config for development
    pub fn development() -> Self {
        Self {
            concurrency: ConcurrencyConfig::default(),
            monitoring: MonitoringConfig { diagnostics: true },
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Builder for ResilienceConfig
#[derive(Debug)]
pub struct ResilienceConfigBuilder {
    config: ResilienceConfig,
}

impl ResilienceConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ResilienceConfig::default(),
        }
    }

    /// Set max concurrent per-package requests
    pub fn max_concurrent_requests(mut self, max: usize) -> Self {
        self.config.concurrency.max_concurrent_requests = max;
        self
    }

    /// Enable/disable diagnostics logging
    pub fn diagnostics(mut self, enabled: bool) -> Self {
        self.config.monitoring.diagnostics = enabled;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn build(self) -> ResilienceConfig {
        self.config
    }
}

impl Default for ResilienceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
