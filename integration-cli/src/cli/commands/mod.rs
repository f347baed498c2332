//! Command handlers

pub mod logs;
pub mod packages;

use anyhow::Result;
use std::sync::Arc;

use crate::api::IntegrationClient;
use crate::api::resilience::{DiagnosticSink, LogSink, NoopSink};
use crate::config::Config;

/// Client for the configured tenant
pub(crate) fn build_client(config: &Config) -> Result<Arc<IntegrationClient>> {
    let client = IntegrationClient::new(
        config.require_base_url()?,
        config.credentials.clone(),
        &config.resilience,
    )?;
    Ok(Arc::new(client))
}

pub(crate) fn diagnostics_sink(config: &Config) -> Arc<dyn DiagnosticSink> {
    if config.resilience.monitoring.diagnostics {
        Arc::new(LogSink)
    } else {
        Arc::new(NoopSink)
    }
}
