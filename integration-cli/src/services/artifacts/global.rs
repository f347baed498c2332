//! Tenant-wide listings partitioned by package
//!
//! Some artifact kinds are listed once for the whole tenant instead of once
//! per package. Those items already name their package; they are grouped, never
//! backfilled, and items without a package id are dropped.

use anyhow::Result;
use std::collections::HashMap;
use std::future::Future;

use crate::api::models::PackageScoped;

/// Items grouped by package id
pub type PackageGroups<T> = HashMap<String, Vec<T>>;

/// Group items by their own package id, dropping untagged items
pub fn group_by_package<T: PackageScoped>(items: Vec<T>) -> PackageGroups<T> {
    let mut groups: PackageGroups<T> = HashMap::new();
    for item in items {
        let Some(package_id) = item.package_id().map(str::to_string) else {
            continue;
        };
        groups.entry(package_id).or_default().push(item);
    }
    groups
}

/// Issue the single tenant-wide request and partition its result
pub async fn fetch_grouped<T, Fut>(fetch: Fut) -> Result<PackageGroups<T>>
where
    T: PackageScoped,
    Fut: Future<Output = Result<Vec<T>>>,
{
    Ok(group_by_package(fetch.await?))
}
