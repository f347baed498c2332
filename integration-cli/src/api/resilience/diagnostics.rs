//! Diagnostic events for absorbed failures
//!
//! Batch operations swallow most failures; a [`DiagnosticSink`] is how they
//! remain observable. The default sink drops everything.

use crate::api::models::ArtifactKind;
use log::{debug, warn};
use std::sync::Mutex;

/// Something the batch layer absorbed instead of returning
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// One package's listing of one artifact kind failed
    PackageFetchFailed {
        kind: ArtifactKind,
        package_id: String,
        error: String,
        rate_limited: bool,
    },
    /// A tenant-wide listing failed and was treated as empty
    KindFetchFailed {
        kind: ArtifactKind,
        error: String,
        rate_limited: bool,
    },
}

pub trait DiagnosticSink: Send + Sync {
    fn record(&self, event: DiagnosticEvent);
}

/// Discards all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn record(&self, _event: DiagnosticEvent) {}
}

/// Writes events through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::PackageFetchFailed {
                kind,
                package_id,
                error,
                rate_limited,
            } => {
                if rate_limited {
                    warn!("Rate limited while fetching {} for package {}", kind, package_id);
                }
                debug!("Failed to fetch {} for package {}: {}", kind, package_id, error);
            }
            DiagnosticEvent::KindFetchFailed {
                kind,
                error,
                rate_limited,
            } => {
                if rate_limited {
                    warn!("Rate limited while listing all {}", kind);
                }
                debug!("Failed to list all {}, treating as empty: {}", kind, error);
            }
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, event: DiagnosticEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
