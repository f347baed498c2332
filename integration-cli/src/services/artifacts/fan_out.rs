//! Per-package fan-out fetching
//!
//! Issues one request per package through a [`BoundedRunner`], absorbing
//! individual failures so the rest of the batch completes.

use anyhow::{Result, bail};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use crate::api::error::is_rate_limit_error;
use crate::api::models::{ArtifactKind, IntegrationPackage, PackageScoped};
use crate::api::resilience::{BoundedRunner, DiagnosticEvent, DiagnosticSink, RateLimitCounter};

/// Where absorbed failures of one batch are reported
#[derive(Clone)]
pub struct FetchContext {
    pub diagnostics: Arc<dyn DiagnosticSink>,
    pub rate_limits: RateLimitCounter,
}

impl FetchContext {
    pub fn new(diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            diagnostics,
            rate_limits: RateLimitCounter::new(),
        }
    }

    /// Count and report a failed listing of `kind` for one package
    pub fn package_failed(&self, kind: ArtifactKind, package_id: &str, err: &anyhow::Error) {
        let rate_limited = self.tally(err);
        self.diagnostics.record(DiagnosticEvent::PackageFetchFailed {
            kind,
            package_id: package_id.to_string(),
            error: format!("{:#}", err),
            rate_limited,
        });
    }

    /// Count and report a failed tenant-wide listing of `kind`
    pub fn kind_failed(&self, kind: ArtifactKind, err: &anyhow::Error) {
        let rate_limited = self.tally(err);
        self.diagnostics.record(DiagnosticEvent::KindFetchFailed {
            kind,
            error: format!("{:#}", err),
            rate_limited,
        });
    }

    fn tally(&self, err: &anyhow::Error) -> bool {
        let rate_limited = is_rate_limit_error(err);
        if rate_limited {
            self.rate_limits.increment();
        }
        rate_limited
    }
}

/// Fetch `kind` for every package with at most `concurrency` requests in flight.
///
/// Every returned item carries the id of the package whose request produced
/// it. A package id listed more than once is fetched once. A failed package
/// contributes nothing. Errors only when the package list itself is malformed
/// or the concurrency limit is zero, before any request.
pub async fn fetch_per_package<T, F, Fut>(
    packages: &[IntegrationPackage],
    kind: ArtifactKind,
    concurrency: usize,
    ctx: &FetchContext,
    fetch: F,
) -> Result<Vec<T>>
where
    T: PackageScoped,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    validate_packages(packages)?;
    let runner = BoundedRunner::new(concurrency)?;

    let tasks = distinct_package_ids(packages).into_iter().map(|package_id| {
        let request = fetch(package_id.to_string());
        fetch_for_package(kind, package_id, ctx, request)
    });

    let batches = runner.run(tasks).await;
    Ok(batches.into_iter().flatten().collect())
}

/// Await one package's listing of `kind`.
///
/// Success is backfilled with `package_id`; failure is reported to `ctx` and
/// yields an empty list.
pub async fn fetch_for_package<T, Fut>(
    kind: ArtifactKind,
    package_id: &str,
    ctx: &FetchContext,
    fetch: Fut,
) -> Vec<T>
where
    T: PackageScoped,
    Fut: Future<Output = Result<Vec<T>>>,
{
    match fetch.await {
        Ok(mut items) => {
            backfill_package_id(&mut items, package_id);
            items
        }
        Err(err) => {
            ctx.package_failed(kind, package_id, &err);
            Vec::new()
        }
    }
}

/// Reject listings with a blank package id
pub fn validate_packages(packages: &[IntegrationPackage]) -> Result<()> {
    if let Some(pos) = packages.iter().position(|p| p.id.trim().is_empty()) {
        bail!("package at position {} has no id", pos);
    }
    Ok(())
}

/// Package ids in listing order, each once
pub fn distinct_package_ids(packages: &[IntegrationPackage]) -> Vec<&str> {
    let mut seen = HashSet::with_capacity(packages.len());
    packages
        .iter()
        .map(|p| p.id.as_str())
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Tag items lacking a package id with `package_id`
pub fn backfill_package_id<T: PackageScoped>(items: &mut [T], package_id: &str) {
    for item in items.iter_mut() {
        if item.package_id().is_none() {
            item.set_package_id(package_id.to_string());
        }
    }
}

/// Await a fetch, turning failure into an empty list plus a diagnostic event
pub async fn fail_soft<T, Fut>(kind: ArtifactKind, ctx: &FetchContext, fetch: Fut) -> Vec<T>
where
    Fut: Future<Output = Result<Vec<T>>>,
{
    match fetch.await {
        Ok(items) => items,
        Err(err) => {
            ctx.kind_failed(kind, &err);
            Vec::new()
        }
    }
}
