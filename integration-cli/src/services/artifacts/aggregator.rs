//! Packages with all their design-time artifacts
//!
//! Lists packages, then collects four artifact kinds for them: integration
//! flows and value mappings through per-package requests, message mappings and
//! script collections through one tenant-wide request each. Results are merged
//! back per package in the order the packages were listed.

use anyhow::{Context, Result, ensure};
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::fan_out::{
    FetchContext, distinct_package_ids, fail_soft, fetch_for_package, fetch_per_package,
    validate_packages,
};
use super::global::{PackageGroups, fetch_grouped, group_by_package};
use crate::api::models::{
    ArtifactKind, IntegrationFlowArtifact, IntegrationPackage, MessageMappingArtifact,
    PackageScoped, ScriptCollectionArtifact, ValueMappingArtifact,
};
use crate::api::resilience::{DiagnosticSink, NoopSink, RateLimitCounter};
use crate::api::source::{PackageCatalog, PageRequest};

/// Default per-package requests in flight for the parallel strategy
pub const DEFAULT_CONCURRENCY: usize = 7;

/// Artifacts of one package, by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageArtifacts {
    pub integration_flows: Vec<IntegrationFlowArtifact>,
    pub message_mappings: Vec<MessageMappingArtifact>,
    pub value_mappings: Vec<ValueMappingArtifact>,
    pub script_collections: Vec<ScriptCollectionArtifact>,
}

impl PackageArtifacts {
    pub fn is_empty(&self) -> bool {
        self.integration_flows.is_empty()
            && self.message_mappings.is_empty()
            && self.value_mappings.is_empty()
            && self.script_collections.is_empty()
    }

    pub fn total(&self) -> usize {
        self.integration_flows.len()
            + self.message_mappings.len()
            + self.value_mappings.len()
            + self.script_collections.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageWithArtifacts {
    pub package: IntegrationPackage,
    pub artifacts: PackageArtifacts,
}

/// Options for [`ArtifactAggregator::get_packages_with_artifacts`]
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationOptions {
    /// Page size for the package listing
    pub top: Option<usize>,
    /// Offset for the package listing
    pub skip: Option<usize>,
    /// Keep packages that ended up with no artifacts at all
    pub include_empty: bool,
    /// Fetch all kinds at once with bounded fan-out instead of package by package
    pub parallel: bool,
    /// Per-package requests in flight per kind; only used when `parallel`
    pub concurrency: usize,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            top: None,
            skip: None,
            include_empty: false,
            parallel: false,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Result of one aggregation batch
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationReport {
    pub packages: Vec<PackageWithArtifacts>,
    /// Requests of this batch rejected with HTTP 429
    pub rate_limit_errors: u64,
}

/// Collects packages with their artifacts from a [`PackageCatalog`]
pub struct ArtifactAggregator {
    catalog: Arc<dyn PackageCatalog>,
    diagnostics: Arc<dyn DiagnosticSink>,
    rate_limit_errors: RateLimitCounter,
}

impl ArtifactAggregator {
    pub fn new(catalog: Arc<dyn PackageCatalog>) -> Self {
        Self {
            catalog,
            diagnostics: Arc::new(NoopSink),
            rate_limit_errors: RateLimitCounter::new(),
        }
    }

    /// Report absorbed failures to `sink`
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// Packages with their artifacts, in listing order.
    ///
    /// Only a failed package listing (or invalid options) is an error; failed
    /// artifact requests just leave the affected collections short. In the
    /// parallel strategy a failed tenant-wide listing is an error too.
    pub async fn get_packages_with_artifacts(
        &self,
        options: &AggregationOptions,
    ) -> Result<Vec<PackageWithArtifacts>> {
        Ok(self.aggregate(options).await?.packages)
    }

    /// Like [`get_packages_with_artifacts`](Self::get_packages_with_artifacts),
    /// also reporting how many requests of this batch were rate limited.
    pub async fn aggregate(&self, options: &AggregationOptions) -> Result<AggregationReport> {
        let packages = self
            .catalog
            .list_packages(PageRequest {
                top: options.top,
                skip: options.skip,
            })
            .await
            .context("Failed to list integration packages")?;

        if packages.is_empty() {
            debug!("No packages listed, nothing to aggregate");
            return Ok(AggregationReport {
                packages: Vec::new(),
                rate_limit_errors: 0,
            });
        }
        validate_packages(&packages)?;

        let mut merged = MergedPackages::new(&packages);
        let ctx = FetchContext::new(Arc::clone(&self.diagnostics));

        debug!(
            "Aggregating artifacts for {} packages ({} strategy)",
            packages.len(),
            if options.parallel { "parallel" } else { "sequential" }
        );

        let outcome = if options.parallel {
            self.collect_parallel(&packages, options.concurrency, &ctx, &mut merged)
                .await
        } else {
            self.collect_sequential(&packages, &ctx, &mut merged).await;
            Ok(())
        };

        let rate_limit_errors = ctx.rate_limits.get();
        self.rate_limit_errors.add(rate_limit_errors);
        outcome?;

        let mut result = merged.entries;
        if !options.include_empty {
            result.retain(|entry| !entry.artifacts.is_empty());
        }

        info!(
            "Aggregated {} packages ({} listed, {} rate-limited requests)",
            result.len(),
            packages.len(),
            rate_limit_errors
        );

        Ok(AggregationReport {
            packages: result,
            rate_limit_errors,
        })
    }

    /// Rate-limited requests across all batches since creation or reset
    pub fn rate_limit_error_count(&self) -> u64 {
        self.rate_limit_errors.get()
    }

    pub fn reset_rate_limit_error_count(&self) {
        self.rate_limit_errors.reset();
    }

    /// All four kinds at once. Per-package kinds are bounded by `concurrency`
    /// each; a failed tenant-wide listing aborts the batch.
    async fn collect_parallel(
        &self,
        packages: &[IntegrationPackage],
        concurrency: usize,
        ctx: &FetchContext,
        merged: &mut MergedPackages,
    ) -> Result<()> {
        ensure!(
            concurrency >= 1,
            "concurrency must be at least 1, got {}",
            concurrency
        );
        let catalog = self.catalog.as_ref();

        let (message_mappings, script_collections, flows, value_mappings) = futures::try_join!(
            async {
                fetch_grouped(catalog.list_message_mappings())
                    .await
                    .context("Failed to list message mappings")
            },
            async {
                fetch_grouped(catalog.list_script_collections())
                    .await
                    .context("Failed to list script collections")
            },
            fetch_per_package(
                packages,
                ArtifactKind::IntegrationFlow,
                concurrency,
                ctx,
                |id| async move { catalog.list_flow_artifacts(&id).await },
            ),
            fetch_per_package(
                packages,
                ArtifactKind::ValueMapping,
                concurrency,
                ctx,
                |id| async move { catalog.list_value_mappings(&id).await },
            ),
        )?;

        merged.merge_groups(message_mappings, |a| &mut a.message_mappings);
        merged.merge_groups(script_collections, |a| &mut a.script_collections);
        merged.merge_items(flows, |a| &mut a.integration_flows);
        merged.merge_items(value_mappings, |a| &mut a.value_mappings);
        Ok(())
    }

    /// Tenant-wide kinds once, then one package at a time. Every listing is
    /// fail-soft, so this never errors.
    async fn collect_sequential(
        &self,
        packages: &[IntegrationPackage],
        ctx: &FetchContext,
        merged: &mut MergedPackages,
    ) {
        let catalog = self.catalog.as_ref();

        let (message_mappings, script_collections) = tokio::join!(
            fail_soft(ArtifactKind::MessageMapping, ctx, catalog.list_message_mappings()),
            fail_soft(ArtifactKind::ScriptCollection, ctx, catalog.list_script_collections()),
        );
        merged.merge_groups(group_by_package(message_mappings), |a| &mut a.message_mappings);
        merged.merge_groups(group_by_package(script_collections), |a| &mut a.script_collections);

        for id in distinct_package_ids(packages) {
            let (flows, value_mappings) = tokio::join!(
                fetch_for_package(
                    ArtifactKind::IntegrationFlow,
                    id,
                    ctx,
                    catalog.list_flow_artifacts(id)
                ),
                fetch_for_package(
                    ArtifactKind::ValueMapping,
                    id,
                    ctx,
                    catalog.list_value_mappings(id)
                ),
            );

            merged.merge_items(flows, |a| &mut a.integration_flows);
            merged.merge_items(value_mappings, |a| &mut a.value_mappings);
        }
    }
}

/// Output records plus an id → position index
struct MergedPackages {
    entries: Vec<PackageWithArtifacts>,
    index: HashMap<String, usize>,
}

impl MergedPackages {
    fn new(packages: &[IntegrationPackage]) -> Self {
        let mut index = HashMap::with_capacity(packages.len());
        let entries = packages
            .iter()
            .enumerate()
            .map(|(pos, package)| {
                // First occurrence wins for duplicated ids
                index.entry(package.id.clone()).or_insert(pos);
                PackageWithArtifacts {
                    package: package.clone(),
                    artifacts: PackageArtifacts::default(),
                }
            })
            .collect();
        Self { entries, index }
    }

    /// Append each item to the package it names; unknown packages are dropped
    fn merge_items<T, F>(&mut self, items: Vec<T>, select: F)
    where
        T: PackageScoped,
        F: Fn(&mut PackageArtifacts) -> &mut Vec<T>,
    {
        for item in items {
            let Some(pos) = item.package_id().and_then(|id| self.index.get(id)).copied() else {
                continue;
            };
            select(&mut self.entries[pos].artifacts).push(item);
        }
    }

    fn merge_groups<T, F>(&mut self, groups: PackageGroups<T>, select: F)
    where
        F: Fn(&mut PackageArtifacts) -> &mut Vec<T>,
    {
        for (package_id, items) in groups {
            if let Some(&pos) = self.index.get(&package_id) {
                select(&mut self.entries[pos].artifacts).extend(items);
            }
        }
    }
}
