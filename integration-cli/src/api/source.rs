//! Collaborator traits consumed by the batch and analysis services
//!
//! [`IntegrationClient`](super::IntegrationClient) implements both against the
//! live API; tests substitute in-memory doubles.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{
    IntegrationFlowArtifact, IntegrationPackage, MessageMappingArtifact, MessageProcessingLog,
    ScriptCollectionArtifact, ValueMappingArtifact,
};
use super::query::Query;

/// Paging for the package listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub top: Option<usize>,
    pub skip: Option<usize>,
}

/// Packages and their design-time artifacts
#[async_trait]
pub trait PackageCatalog: Send + Sync {
    async fn list_packages(&self, page: PageRequest) -> Result<Vec<IntegrationPackage>>;

    /// Integration flows of one package (per-package endpoint)
    async fn list_flow_artifacts(&self, package_id: &str) -> Result<Vec<IntegrationFlowArtifact>>;

    /// Value mappings of one package (per-package endpoint)
    async fn list_value_mappings(&self, package_id: &str) -> Result<Vec<ValueMappingArtifact>>;

    /// All message mappings of the tenant, tagged with their package
    async fn list_message_mappings(&self) -> Result<Vec<MessageMappingArtifact>>;

    /// All script collections of the tenant, tagged with their package
    async fn list_script_collections(&self) -> Result<Vec<ScriptCollectionArtifact>>;
}

/// Paginated message processing log retrieval
#[async_trait]
pub trait MessageLogSource: Send + Sync {
    /// Up to `query.top` logs matching the query
    async fn list_message_logs(&self, query: &Query) -> Result<Vec<MessageProcessingLog>>;
}
