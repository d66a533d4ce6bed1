//! Registry test utilities

use std::sync::Arc;
use std::time::Duration;

use mockito::ServerGuard;

use cuba_sdk::http::ReqwestFetcher;
use cuba_sdk::model::repository::{Repository, RepositoryTarget, RepositoryType};
use cuba_sdk::provider::{ComponentRegistry, SdkContext};
use cuba_sdk::repository::memory::MemoryRepositoryStore;
use cuba_sdk::resources::BundledResources;
use cuba_sdk::settings::SdkSettings;
use cuba_sdk::version::cache::ManualClock;

/// Nexus2 search path served by the mock server
pub const NEXUS2_SEARCH_PATH: &str = "/service/local/lucene/search";

/// Registry wired to a mock server, plus the clock driving its caches
pub struct TestRegistry {
    pub registry: ComponentRegistry,
    pub clock: Arc<ManualClock>,
}

/// Builder for a fully assembled registry whose remote calls go to `server`
pub struct TestRegistryBuilder<'a> {
    server: &'a ServerGuard,
    settings: SdkSettings,
    store: MemoryRepositoryStore,
}

impl<'a> TestRegistryBuilder<'a> {
    pub fn new(server: &'a ServerGuard) -> Self {
        Self {
            server,
            settings: SdkSettings::default(),
            store: MemoryRepositoryStore::new(),
        }
    }

    /// Sets `key` to `path` on the mock server
    pub fn with_server_url(mut self, key: &str, path: &str) -> Self {
        self.settings = self
            .settings
            .with_property(key, &format!("{}{}", self.server.url(), path));
        self
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.settings = self.settings.with_property(key, value);
        self
    }

    /// Adds a Nexus2 SEARCH repository served at [`NEXUS2_SEARCH_PATH`]
    pub fn with_nexus2_search(mut self) -> Self {
        let url = format!("{}{}", self.server.url(), NEXUS2_SEARCH_PATH);
        self.store = self.store.with_repository(
            RepositoryTarget::Search,
            Repository::new("nexus", RepositoryType::Nexus2, &url),
        );
        self
    }

    pub fn build(self) -> TestRegistry {
        let clock = Arc::new(ManualClock::new(0));
        let context = SdkContext {
            settings: Arc::new(self.settings),
            store: Arc::new(self.store),
            fetcher: Arc::new(ReqwestFetcher::new(Duration::from_secs(5)).unwrap()),
            resources: Arc::new(BundledResources),
            clock: clock.clone(),
        };

        TestRegistry {
            registry: ComponentRegistry::assemble(&context),
            clock,
        }
    }
}

/// Nexus2 search body listing `versions`
pub fn nexus2_body(versions: &[&str]) -> String {
    let data: Vec<serde_json::Value> = versions
        .iter()
        .map(|version| serde_json::json!({ "version": version }))
        .collect();
    serde_json::json!({ "data": data }).to_string()
}
