//! Integration platform API module
//!
//! Typed access to integration packages, their design-time artifacts and
//! message processing logs, plus the resilience primitives the batch
//! services are built on.

pub mod client;
pub mod constants;
pub mod error;
pub mod models;
pub mod odata;
pub mod query;
pub mod resilience;
pub mod source;

pub use client::{Credentials, IntegrationClient};
pub use error::{ApiError, is_rate_limit_error};
pub use models::{
    ArtifactKind, ErrorInformation, IntegrationFlowArtifact, IntegrationPackage,
    MessageMappingArtifact, MessageProcessingLog, PackageScoped, ScriptCollectionArtifact,
    ValueMappingArtifact,
};
pub use query::{Filter, FilterValue, OrderBy, Query};
pub use resilience::{
    BoundedRunner, DiagnosticEvent, DiagnosticSink, LogSink, NoopSink, RateLimitCounter,
    ResilienceConfig, RunnerStats,
};
pub use source::{MessageLogSource, PackageCatalog, PageRequest};
