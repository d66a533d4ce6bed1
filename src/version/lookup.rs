//! Cached version discovery for one provider

use std::sync::Arc;

use tracing::{debug, warn};

use crate::model::repository::RepositoryTarget;
use crate::repository::store::RepositoryStore;
use crate::settings::Settings;
use crate::version::cache::VersionCache;
use crate::version::search::{SearchEndpoint, SearchProtocol, VersionSearch, split_component_id};
use crate::version::types::VersionOption;

/// Answers `versions(component_id)` from the provider's cache, falling back to
/// the SEARCH repositories on a miss.
pub struct VersionLookup {
    search: VersionSearch,
    settings: Arc<dyn Settings>,
    store: Arc<dyn RepositoryStore>,
    cache: VersionCache,
    framework: Option<(String, SearchProtocol)>,
}

impl VersionLookup {
    pub fn new(
        search: VersionSearch,
        settings: Arc<dyn Settings>,
        store: Arc<dyn RepositoryStore>,
        cache: VersionCache,
    ) -> Self {
        Self {
            search,
            settings,
            store,
            cache,
            framework: None,
        }
    }

    /// Restricts searches to `protocol` endpoints and honours the
    /// `<framework>.artifact.base.url` override
    pub fn for_framework(mut self, framework: &str, protocol: SearchProtocol) -> Self {
        self.framework = Some((framework.to_string(), protocol));
        self
    }

    /// Endpoints to query, in priority order
    pub fn endpoints(&self) -> Vec<SearchEndpoint> {
        let mut endpoints = Vec::new();

        if let Some((framework, protocol)) = &self.framework {
            if let Some(url) = self.settings.get(&format!("{}.artifact.base.url", framework)) {
                endpoints.push(SearchEndpoint::new(*protocol, &url));
            }
        }

        let repositories = self
            .store
            .get_repositories(RepositoryTarget::Search)
            .inspect_err(|e| warn!("Failed to read search repositories: {}", e))
            .unwrap_or_default();

        endpoints.extend(
            repositories
                .iter()
                .filter_map(SearchEndpoint::from_repository)
                .filter(|endpoint| match &self.framework {
                    Some((_, protocol)) => endpoint.protocol == *protocol,
                    None => true,
                }),
        );

        endpoints
    }

    /// Ranked versions of `component_id` (`group:artifact`). None and malformed
    /// ids give an empty list without touching the network.
    pub async fn versions(&self, component_id: Option<&str>) -> Vec<VersionOption> {
        let Some(component_id) = component_id else {
            return Vec::new();
        };
        if split_component_id(component_id).is_none() {
            debug!("Ignoring malformed component id '{}'", component_id);
            return Vec::new();
        }

        self.cache
            .get_or_load(component_id, || self.load(component_id))
            .await
    }

    /// Versions of `component_id` already in the cache, without any lookup
    pub fn cached_versions(&self, component_id: &str) -> Vec<VersionOption> {
        self.cache.peek(component_id).unwrap_or_default()
    }

    async fn load(&self, component_id: &str) -> Vec<VersionOption> {
        for endpoint in self.endpoints() {
            let versions = self.search.search(&endpoint, component_id).await;
            if !versions.is_empty() {
                return versions.iter().map(|v| VersionOption::plain(v)).collect();
            }
        }
        debug!("No versions discovered for {}", component_id);
        Vec::new()
    }
}
