//! In-memory package catalog for tests

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::{Duration, sleep};

use crate::api::error::status_error;
use crate::api::models::{
    IntegrationFlowArtifact, IntegrationPackage, MessageMappingArtifact, ScriptCollectionArtifact,
    ValueMappingArtifact,
};
use crate::api::source::{PackageCatalog, PageRequest};

pub fn packages(ids: &[&str]) -> Vec<IntegrationPackage> {
    ids.iter()
        .map(|id| IntegrationPackage {
            id: id.to_string(),
            name: format!("Package {}", id),
            ..Default::default()
        })
        .collect()
}

pub fn flow(id: &str, package_id: Option<&str>) -> IntegrationFlowArtifact {
    IntegrationFlowArtifact {
        id: id.to_string(),
        name: id.to_string(),
        version: None,
        package_id: package_id.map(str::to_string),
    }
}

pub fn value_mapping(id: &str, package_id: Option<&str>) -> ValueMappingArtifact {
    ValueMappingArtifact {
        id: id.to_string(),
        name: id.to_string(),
        version: None,
        package_id: package_id.map(str::to_string),
    }
}

pub fn message_mapping(id: &str, package_id: Option<&str>) -> MessageMappingArtifact {
    MessageMappingArtifact {
        id: id.to_string(),
        name: id.to_string(),
        version: None,
        package_id: package_id.map(str::to_string),
    }
}

pub fn script_collection(id: &str, package_id: Option<&str>) -> ScriptCollectionArtifact {
    ScriptCollectionArtifact {
        id: id.to_string(),
        name: id.to_string(),
        version: None,
        package_id: package_id.map(str::to_string),
    }
}

/// Listing outcome: items, or the HTTP status the request fails with
pub type Canned<T> = std::result::Result<Vec<T>, u16>;

fn replay<T: Clone>(canned: Option<&Canned<T>>) -> Result<Vec<T>> {
    match canned {
        None => Ok(Vec::new()),
        Some(Ok(items)) => Ok(items.clone()),
        Some(Err(status)) => Err(status_error(*status)),
    }
}

#[derive(Default)]
pub struct MockCatalog {
    pub packages: Vec<IntegrationPackage>,
    pub packages_error: Option<u16>,
    pub flows: HashMap<String, Canned<IntegrationFlowArtifact>>,
    pub value_mappings: HashMap<String, Canned<ValueMappingArtifact>>,
    pub message_mappings: Option<Canned<MessageMappingArtifact>>,
    pub script_collections: Option<Canned<ScriptCollectionArtifact>>,

    pub per_package_calls: AtomicUsize,
    pub global_calls: AtomicUsize,
    active: AtomicUsize,
    pub peak_active: AtomicUsize,
}

impl MockCatalog {
    pub fn with_packages(ids: &[&str]) -> Self {
        Self {
            packages: packages(ids),
            ..Default::default()
        }
    }

    pub fn per_package_calls(&self) -> usize {
        self.per_package_calls.load(Ordering::SeqCst)
    }

    pub fn global_calls(&self) -> usize {
        self.global_calls.load(Ordering::SeqCst)
    }

    async fn per_package<T: Clone>(&self, canned: Option<&Canned<T>>) -> Result<Vec<T>> {
        self.per_package_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(now, Ordering::SeqCst);
        sleep(Duration::from_millis(2)).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        replay(canned)
    }
}

#[async_trait]
impl PackageCatalog for MockCatalog {
    async fn list_packages(&self, page: PageRequest) -> Result<Vec<IntegrationPackage>> {
        if let Some(status) = self.packages_error {
            return Err(status_error(status));
        }
        let skip = page.skip.unwrap_or(0);
        let top = page.top.unwrap_or(usize::MAX);
        Ok(self.packages.iter().skip(skip).take(top).cloned().collect())
    }

    async fn list_flow_artifacts(&self, package_id: &str) -> Result<Vec<IntegrationFlowArtifact>> {
        self.per_package(self.flows.get(package_id)).await
    }

    async fn list_value_mappings(&self, package_id: &str) -> Result<Vec<ValueMappingArtifact>> {
        self.per_package(self.value_mappings.get(package_id)).await
    }

    async fn list_message_mappings(&self) -> Result<Vec<MessageMappingArtifact>> {
        self.global_calls.fetch_add(1, Ordering::SeqCst);
        replay(self.message_mappings.as_ref())
    }

    async fn list_script_collections(&self) -> Result<Vec<ScriptCollectionArtifact>> {
        self.global_calls.fetch_add(1, Ordering::SeqCst);
        replay(self.script_collections.as_ref())
    }
}
