//! Explicit provider assembly and background metadata loading

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use indexmap::IndexMap;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::VERSION_CACHE_TTL_MS;
use crate::http::HttpFetcher;
use crate::provider::addon::AddonProvider;
use crate::provider::catalog::AddonCatalog;
use crate::provider::error::ProviderError;
use crate::provider::framework::{Framework, FrameworkProvider};
use crate::provider::library::LibProvider;
use crate::provider::resolver::ModuleResolver;
use crate::provider::ComponentProvider;
use crate::repository::pom::RepositoryPomReader;
use crate::repository::search::ComponentSearch;
use crate::repository::store::RepositoryStore;
use crate::resources::ResourceLoader;
use crate::settings::Settings;
use crate::version::cache::{Clock, VersionCache};
use crate::version::lookup::VersionLookup;
use crate::version::search::VersionSearch;

/// Collaborators every provider is built from
#[derive(Clone)]
pub struct SdkContext {
    pub settings: Arc<dyn Settings>,
    pub store: Arc<dyn RepositoryStore>,
    pub fetcher: Arc<dyn HttpFetcher>,
    pub resources: Arc<dyn ResourceLoader>,
    pub clock: Arc<dyn Clock>,
}

impl SdkContext {
    /// Version lookup with a cache of its own
    fn lookup(&self) -> VersionLookup {
        VersionLookup::new(
            VersionSearch::new(Arc::clone(&self.fetcher)),
            Arc::clone(&self.settings),
            Arc::clone(&self.store),
            VersionCache::new(VERSION_CACHE_TTL_MS, Arc::clone(&self.clock)),
        )
    }
}

/// Providers keyed by their type, in registration order
#[derive(Default)]
pub struct ComponentRegistry {
    providers: IndexMap<&'static str, Arc<dyn ComponentProvider>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the library, framework and addon providers for both platforms
    pub fn assemble(context: &SdkContext) -> Self {
        let pom_reader = Arc::new(RepositoryPomReader::new(
            Arc::clone(&context.store),
            Arc::clone(&context.fetcher),
        ));
        let resolver = Arc::new(ModuleResolver::new(
            ComponentSearch::new(Arc::clone(&context.fetcher)),
            pom_reader,
            Arc::clone(&context.store),
        ));

        let mut registry = Self::new();
        registry.register(Arc::new(LibProvider::new(context.lookup())));

        for framework in [Framework::Cuba, Framework::Jmix] {
            let platform = Arc::new(FrameworkProvider::new(
                framework,
                context.lookup(),
                Arc::clone(&resolver),
                Arc::clone(&context.settings),
            ));
            let catalog = AddonCatalog::new(
                framework,
                Arc::clone(&context.settings),
                Arc::clone(&context.resources),
                Arc::clone(&context.fetcher),
            );
            let addons = AddonProvider::new(Arc::clone(&platform), catalog, Arc::clone(&context.settings));

            registry.register(platform);
            registry.register(Arc::new(addons));
        }

        registry
    }

    /// Adds `provider`, replacing any provider of the same type
    pub fn register(&mut self, provider: Arc<dyn ComponentProvider>) {
        if let Some(previous) = self.providers.insert(provider.provider_type(), provider) {
            warn!("Provider type {} registered twice", previous.provider_type());
        }
    }

    pub fn provider(&self, provider_type: &str) -> Option<Arc<dyn ComponentProvider>> {
        self.providers.get(provider_type).cloned()
    }

    pub fn providers(&self) -> impl Iterator<Item = &Arc<dyn ComponentProvider>> {
        self.providers.values()
    }

    /// Starts `load()` of every provider on its own task
    pub fn load_all(&self) -> LoadHandles {
        let handles = self
            .providers
            .values()
            .map(|provider| {
                let provider = Arc::clone(provider);
                let provider_type = provider.provider_type();
                (provider_type, tokio::spawn(async move { provider.load().await }))
            })
            .collect();
        LoadHandles { handles }
    }
}

/// Running provider loads
pub struct LoadHandles {
    handles: Vec<(&'static str, JoinHandle<Result<(), ProviderError>>)>,
}

impl LoadHandles {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Waits up to `timeout` for every load to finish. Failed and panicked
    /// loads are logged; the result tells whether all finished in time.
    /// Loads still running after the timeout keep going in the background.
    pub async fn wait_ready(self, timeout: Duration) -> bool {
        let (types, handles): (Vec<_>, Vec<_>) = self.handles.into_iter().unzip();

        let Ok(results) = tokio::time::timeout(timeout, join_all(handles)).await else {
            warn!("Provider metadata not ready after {:?}, continuing with offline data", timeout);
            return false;
        };

        for (provider_type, result) in types.into_iter().zip(results) {
            match result {
                Ok(Ok(())) => info!("Provider {} loaded", provider_type),
                Ok(Err(e)) => error!("Provider {} failed to load: {}", provider_type, e),
                Err(e) => error!("Provider {} load task failed: {}", provider_type, e),
            }
        }
        true
    }
}
