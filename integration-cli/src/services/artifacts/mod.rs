// Package artifact aggregation
//
// Bounded per-package fan-out, tenant-wide listings partitioned by package, and
// the aggregator that merges both into one record per package.

pub mod aggregator;
pub mod fan_out;
pub mod global;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::{
    AggregationOptions, AggregationReport, ArtifactAggregator, DEFAULT_CONCURRENCY,
    PackageArtifacts, PackageWithArtifacts,
};
pub use fan_out::{FetchContext, backfill_package_id, fail_soft, fetch_per_package};
pub use global::{PackageGroups, fetch_grouped, group_by_package};
