//! Integration platform entity models
//!
//! Only the fields the client reads are modeled; everything else in the
//! OData payload is ignored during deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::odata::odata_datetime;

/// An integration package, the parent of all design-time artifacts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IntegrationPackage {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub short_text: Option<String>,
}

/// Design-time artifact that belongs to exactly one package
pub trait PackageScoped {
    fn package_id(&self) -> Option<&str>;
    fn set_package_id(&mut self, package_id: String);
}

macro_rules! package_scoped_artifact {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "PascalCase")]
        pub struct $name {
            pub id: String,
            #[serde(default)]
            pub name: String,
            #[serde(default)]
            pub version: Option<String>,
            /// Owning package. Per-package listings may omit it.
            #[serde(default)]
            pub package_id: Option<String>,
        }

        impl PackageScoped for $name {
            fn package_id(&self) -> Option<&str> {
                self.package_id.as_deref().filter(|id| !id.is_empty())
            }

            fn set_package_id(&mut self, package_id: String) {
                self.package_id = Some(package_id);
            }
        }
    };
}

package_scoped_artifact!(
    /// Integration flow (iFlow) design-time artifact
    IntegrationFlowArtifact
);
package_scoped_artifact!(
    /// Message mapping design-time artifact
    MessageMappingArtifact
);
package_scoped_artifact!(
    /// Value mapping design-time artifact
    ValueMappingArtifact
);
package_scoped_artifact!(
    /// Script collection design-time artifact
    ScriptCollectionArtifact
);

/// Artifact kinds aggregated per package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    IntegrationFlow,
    MessageMapping,
    ValueMapping,
    ScriptCollection,
}

impl ArtifactKind {
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::IntegrationFlow => "integration flows",
            ArtifactKind::MessageMapping => "message mappings",
            ArtifactKind::ValueMapping => "value mappings",
            ArtifactKind::ScriptCollection => "script collections",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Error details attached to a failed message processing log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorInformation {
    #[serde(default, rename = "Type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One message processing log entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageProcessingLog {
    pub message_guid: String,
    #[serde(default)]
    pub integration_flow_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, with = "odata_datetime")]
    pub log_start: Option<DateTime<Utc>>,
    #[serde(default, with = "odata_datetime")]
    pub log_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_information: Option<ErrorInformation>,
}

impl MessageProcessingLog {
    pub fn error_type(&self) -> Option<&str> {
        self.error_information
            .as_ref()
            .and_then(|info| info.error_type.as_deref())
            .filter(|t| !t.is_empty())
    }
}
