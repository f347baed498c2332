//! Rate-limit rejection counter

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared count of requests rejected with HTTP 429.
///
/// Clones share the same count.
#[derive(Debug, Clone, Default)]
pub struct RateLimitCounter {
    count: Arc<AtomicU64>,
}

impl RateLimitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, n: u64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.count.store(0, Ordering::Relaxed);
    }
}
