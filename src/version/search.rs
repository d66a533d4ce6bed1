//! Remote version search against Nexus2 (lucene) and Nexus3 (REST) endpoints

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::http::{HttpFetcher, HttpRequest};
use crate::model::repository::{Authentication, Repository, RepositoryType};
use crate::version::error::SearchError;
use crate::version::ranking::latest_per_major;

/// Wire protocol of a search endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchProtocol {
    /// `GET url?g=<group>&a=<artifact>`, versions in `data[].version`
    Nexus2,
    /// `GET url?group=<group>&name=<artifact>`, versions in `items[].version`
    Nexus3,
}

impl SearchProtocol {
    pub fn for_repository_type(repository_type: RepositoryType) -> Option<Self> {
        match repository_type {
            RepositoryType::Nexus2 => Some(SearchProtocol::Nexus2),
            RepositoryType::Nexus3 => Some(SearchProtocol::Nexus3),
            RepositoryType::Local => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEndpoint {
    pub protocol: SearchProtocol,
    pub url: String,
    pub auth: Option<Authentication>,
    /// Nexus3 repository to narrow the search to; empty searches all
    pub repository_name: String,
}

impl SearchEndpoint {
    pub fn new(protocol: SearchProtocol, url: &str) -> Self {
        Self {
            protocol,
            url: url.to_string(),
            auth: None,
            repository_name: String::new(),
        }
    }

    /// Endpoint for a SEARCH repository; local repositories have none
    pub fn from_repository(repository: &Repository) -> Option<Self> {
        let protocol = SearchProtocol::for_repository_type(repository.repository_type)?;
        Some(Self {
            protocol,
            url: repository.url.clone(),
            auth: repository.authentication.clone(),
            repository_name: repository.repository_name.clone(),
        })
    }

    fn request(&self, group_id: &str, artifact_id: &str) -> HttpRequest {
        let request = HttpRequest::get(&self.url)
            .header("Accept", "application/json")
            .auth(self.auth.as_ref());
        match self.protocol {
            SearchProtocol::Nexus2 => request.query("g", group_id).query("a", artifact_id),
            SearchProtocol::Nexus3 => {
                let request = request.query("group", group_id).query("name", artifact_id);
                if self.repository_name.is_empty() {
                    request
                } else {
                    request.query("repository", &self.repository_name)
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct Nexus2Response {
    #[serde(default)]
    data: Vec<VersionEntry>,
}

#[derive(Debug, Deserialize)]
struct Nexus3Response {
    #[serde(default)]
    items: Vec<VersionEntry>,
}

#[derive(Debug, Deserialize)]
struct VersionEntry {
    version: Option<String>,
}

/// Splits `group:artifact[:...]` into its first two segments
pub fn split_component_id(component_id: &str) -> Option<(&str, &str)> {
    let mut segments = component_id.split(':');
    let group_id = segments.next().filter(|s| !s.is_empty())?;
    let artifact_id = segments.next().filter(|s| !s.is_empty())?;
    Some((group_id, artifact_id))
}

#[derive(Clone)]
pub struct VersionSearch {
    fetcher: Arc<dyn HttpFetcher>,
}

impl VersionSearch {
    pub fn new(fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetches every version the endpoint knows for `group_id:artifact_id`, unranked
    pub async fn fetch_versions(
        &self,
        endpoint: &SearchEndpoint,
        group_id: &str,
        artifact_id: &str,
    ) -> Result<Vec<String>, SearchError> {
        let body = self
            .fetcher
            .get(endpoint.request(group_id, artifact_id))
            .await?;

        let entries = match endpoint.protocol {
            SearchProtocol::Nexus2 => {
                serde_json::from_str::<Nexus2Response>(&body)
                    .map_err(|e| SearchError::InvalidResponse(e.to_string()))?
                    .data
            }
            SearchProtocol::Nexus3 => {
                serde_json::from_str::<Nexus3Response>(&body)
                    .map_err(|e| SearchError::InvalidResponse(e.to_string()))?
                    .items
            }
        };

        let versions: Vec<String> = entries.into_iter().filter_map(|e| e.version).collect();
        debug!(
            "Found {} versions for {}:{} at {}",
            versions.len(),
            group_id,
            artifact_id,
            endpoint.url
        );
        Ok(versions)
    }

    /// Latest version per major line for `component_id`.
    ///
    /// Malformed ids and failed searches yield an empty list.
    pub async fn search(&self, endpoint: &SearchEndpoint, component_id: &str) -> Vec<String> {
        let Some((group_id, artifact_id)) = split_component_id(component_id) else {
            debug!("Ignoring malformed component id '{}'", component_id);
            return Vec::new();
        };

        let Ok(versions) = self
            .fetch_versions(endpoint, group_id, artifact_id)
            .await
            .inspect_err(|e| warn!("Version search for {} failed: {}", component_id, e))
        else {
            return Vec::new();
        };

        latest_per_major(versions)
    }
}
