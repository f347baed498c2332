//! HTTP client for the integration platform OData API

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, trace};
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::constants::API_PATH;
use super::error::ApiError;
use super::models::{
    IntegrationFlowArtifact, IntegrationPackage, MessageMappingArtifact, MessageProcessingLog,
    ScriptCollectionArtifact, ValueMappingArtifact,
};
use super::odata::ODataCollection;
use super::query::Query;
use super::resilience::ResilienceConfig;
use super::source::{MessageLogSource, PackageCatalog, PageRequest};

/// Basic credentials passed through to every request
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Thin typed client over the tenant's OData endpoints
#[derive(Debug, Clone)]
pub struct IntegrationClient {
    http: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl IntegrationClient {
    pub fn new(
        base_url: &str,
        credentials: Option<Credentials>,
        resilience: &ResilienceConfig,
    ) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()).into());
        }

        let http = Client::builder()
            .timeout(resilience.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, resource: &str, query: &Query) -> String {
        format!(
            "{}{}/{}?{}",
            self.base_url,
            API_PATH,
            resource,
            query.to_query_string()
        )
    }

    async fn get_page<T: DeserializeOwned>(&self, url: &str) -> Result<ODataCollection<T>, ApiError> {
        trace!("GET {}", url);
        let mut request = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                method: "GET".to_string(),
                url: url.to_string(),
                status,
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Fetch a collection, following `__next` links until `limit` items are
    /// collected or the server stops paging.
    async fn get_collection<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &Query,
        limit: Option<usize>,
    ) -> Result<Vec<T>> {
        let mut url = self.collection_url(resource, query);
        let mut items = Vec::new();

        loop {
            let page = self
                .get_page::<T>(&url)
                .await
                .with_context(|| format!("Failed to list {}", resource))?;
            items.extend(page.d.results);

            if let Some(limit) = limit {
                if items.len() >= limit {
                    items.truncate(limit);
                    break;
                }
            }

            match page.d.next {
                Some(next) => {
                    debug!("{}: following continuation link ({} so far)", resource, items.len());
                    url = self.absolute_url(&next);
                }
                None => break,
            }
        }

        Ok(items)
    }

    /// Resolve a continuation link: absolute, host-relative (`/...`) or
    /// relative to the service root
    fn absolute_url(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else if link.starts_with('/') {
            format!("{}{}", self.base_url, link)
        } else {
            format!("{}{}/{}", self.base_url, API_PATH, link)
        }
    }
}

fn package_resource(package_id: &str, navigation: &str) -> String {
    format!(
        "IntegrationPackages('{}')/{}",
        urlencoding::encode(&package_id.replace('\'', "''")),
        navigation
    )
}

#[async_trait]
impl PackageCatalog for IntegrationClient {
    async fn list_packages(&self, page: PageRequest) -> Result<Vec<IntegrationPackage>> {
        let mut query = Query::new();
        query.top = page.top;
        query.skip = page.skip;
        self.get_collection("IntegrationPackages", &query, page.top)
            .await
    }

    async fn list_flow_artifacts(&self, package_id: &str) -> Result<Vec<IntegrationFlowArtifact>> {
        let resource = package_resource(package_id, "IntegrationDesigntimeArtifacts");
        self.get_collection(&resource, &Query::new(), None).await
    }

    async fn list_value_mappings(&self, package_id: &str) -> Result<Vec<ValueMappingArtifact>> {
        let resource = package_resource(package_id, "ValueMappingDesigntimeArtifacts");
        self.get_collection(&resource, &Query::new(), None).await
    }

    async fn list_message_mappings(&self) -> Result<Vec<MessageMappingArtifact>> {
        self.get_collection("MessageMappingDesigntimeArtifacts", &Query::new(), None)
            .await
    }

    async fn list_script_collections(&self) -> Result<Vec<ScriptCollectionArtifact>> {
        self.get_collection("ScriptCollectionDesigntimeArtifacts", &Query::new(), None)
            .await
    }
}

#[async_trait]
impl MessageLogSource for IntegrationClient {
    async fn list_message_logs(&self, query: &Query) -> Result<Vec<MessageProcessingLog>> {
        self.get_collection("MessageProcessingLogs", query, query.top)
            .await
    }
}
