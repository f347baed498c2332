//! Bounded task runner
//!
//! Drives a batch of deferred futures with a fixed number in flight at once.
//! All futures are polled from the calling task; nothing is spawned.

use anyhow::{Result, ensure};
use futures::stream::{FuturesUnordered, StreamExt};
use log::debug;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Runs futures with at most `limit` of them unresolved at any instant
#[derive(Debug, Clone)]
pub struct BoundedRunner {
    limit: usize,
    tasks_admitted: Arc<AtomicU64>,
    tasks_waited: Arc<AtomicU64>,
}

impl BoundedRunner {
    /// Create a runner. A limit of zero is rejected.
    pub fn new(limit: usize) -> Result<Self> {
        ensure!(limit >= 1, "concurrency limit must be at least 1, got {}", limit);
        Ok(Self {
            limit,
            tasks_admitted: Arc::new(AtomicU64::new(0)),
            tasks_waited: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Run every task to completion and collect the outputs.
    ///
    /// Outputs arrive in completion order, not input order.
    pub async fn run<I, F>(&self, tasks: I) -> Vec<F::Output>
    where
        I: IntoIterator<Item = F>,
        F: Future,
    {
        let mut in_flight = FuturesUnordered::new();
        let mut outputs = Vec::new();

        for task in tasks {
            if in_flight.len() >= self.limit {
                self.tasks_waited.fetch_add(1, Ordering::Relaxed);
                debug!("Task runner: waiting for a slot ({} in flight)", self.limit);
                if let Some(output) = in_flight.next().await {
                    outputs.push(output);
                }
            }
            self.tasks_admitted.fetch_add(1, Ordering::Relaxed);
            in_flight.push(task);
        }

        while let Some(output) = in_flight.next().await {
            outputs.push(output);
        }

        outputs
    }

    /// Like [`run`](Self::run), but the first failing task fails the whole batch.
    ///
    /// Tasks still in flight at that point are dropped; tasks not yet admitted
    /// never start.
    pub async fn try_run<I, F, T, E>(&self, tasks: I) -> Result<Vec<T>, E>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = Result<T, E>>,
    {
        let mut in_flight = FuturesUnordered::new();
        let mut outputs = Vec::new();

        for task in tasks {
            if in_flight.len() >= self.limit {
                self.tasks_waited.fetch_add(1, Ordering::Relaxed);
                if let Some(output) = in_flight.next().await {
                    outputs.push(output?);
                }
            }
            self.tasks_admitted.fetch_add(1, Ordering::Relaxed);
            in_flight.push(task);
        }

        while let Some(output) = in_flight.next().await {
            outputs.push(output?);
        }

        Ok(outputs)
    }

    pub fn stats(&self) -> RunnerStats {
        RunnerStats {
            limit: self.limit,
            tasks_admitted: self.tasks_admitted.load(Ordering::Relaxed),
            tasks_waited: self.tasks_waited.load(Ordering::Relaxed),
        }
    }

    pub fn reset_stats(&self) {
        self.tasks_admitted.store(0, Ordering::Relaxed);
        self.tasks_waited.store(0, Ordering::Relaxed);
    }
}

/// Statistics for the bounded runner
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerStats {
    /// Maximum tasks in flight
    pub limit: usize,
    /// Tasks admitted since creation/reset
    pub tasks_admitted: u64,
    /// Admissions that had to wait for a free slot
    pub tasks_waited: u64,
}

impl RunnerStats {
    /// Fraction of admissions that had to wait
    pub fn wait_rate(&self) -> f64 {
        if self.tasks_admitted == 0 {
            0.0
        } else {
            self.tasks_waited as f64 / self.tasks_admitted as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::{Duration, sleep};

    struct Gauge {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl Gauge {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            })
        }

        async fn track(&self, millis: u64) {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            sleep(Duration::from_millis(millis)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_zero_limit_rejected() {
        assert!(BoundedRunner::new(0).is_err());
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let runner = BoundedRunner::new(3).unwrap();
        let tasks: Vec<std::future::Ready<u32>> = Vec::new();
        assert!(runner.run(tasks).await.is_empty());
        assert_eq!(runner.stats().tasks_admitted, 0);
    }

    #[tokio::test]
    async fn test_never_exceeds_limit() {
        let runner = BoundedRunner::new(3).unwrap();
        let gauge = Gauge::new();

        let tasks: Vec<_> = (0..20u64)
            .map(|i| {
                let gauge = Arc::clone(&gauge);
                async move {
                    gauge.track(1 + i % 4).await;
                    i
                }
            })
            .collect();

        let mut outputs = runner.run(tasks).await;
        outputs.sort();

        assert_eq!(outputs, (0..20).collect::<Vec<_>>());
        assert_eq!(gauge.peak.load(Ordering::SeqCst), 3);
        assert_eq!(gauge.active.load(Ordering::SeqCst), 0);

        let stats = runner.stats();
        assert_eq!(stats.tasks_admitted, 20);
        assert_eq!(stats.tasks_waited, 17);
        assert!((stats.wait_rate() - 0.85).abs() < 1e-9);

        runner.reset_stats();
        assert_eq!(runner.stats().tasks_admitted, 0);
        assert_eq!(runner.limit(), 3);
    }

    #[tokio::test]
    async fn test_limit_of_one_is_sequential() {
        let runner = BoundedRunner::new(1).unwrap();
        let gauge = Gauge::new();

        let tasks: Vec<_> = (0..5u64)
            .map(|i| {
                let gauge = Arc::clone(&gauge);
                async move {
                    gauge.track(1).await;
                    i
                }
            })
            .collect();

        let outputs = runner.run(tasks).await;
        assert_eq!(outputs, vec![0, 1, 2, 3, 4]);
        assert_eq!(gauge.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_try_run_propagates_failure() {
        let runner = BoundedRunner::new(2).unwrap();
        let tasks: Vec<_> = (0..4)
            .map(|i| async move {
                if i == 2 {
                    Err(format!("task {} failed", i))
                } else {
                    Ok(i)
                }
            })
            .collect();

        let result = runner.try_run(tasks).await;
        assert_eq!(result.unwrap_err(), "task 2 failed");
    }

    #[tokio::test]
    async fn test_try_run_collects_all_successes() {
        let runner = BoundedRunner::new(2).unwrap();
        let tasks: Vec<_> = (0..4).map(|i| async move { Ok::<_, String>(i * 10) }).collect();

        let mut outputs = runner.try_run(tasks).await.unwrap();
        outputs.sort();
        assert_eq!(outputs, vec![0, 10, 20, 30]);
    }
}
