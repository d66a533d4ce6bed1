use std::sync::Arc;

use tracing::{debug, warn};

use crate::model::artifact::MvnArtifact;
use crate::model::classifier::Classifier;
use crate::model::component::Component;
use crate::model::repository::RepositoryTarget;
use crate::repository::error::PomError;
use crate::repository::pom::{PomModel, PomReader};
use crate::repository::search::{ComponentSearch, SearchQuery};
use crate::repository::store::RepositoryStore;

/// Completes component templates against the configured repositories
pub struct ModuleResolver {
    search: ComponentSearch,
    pom_reader: Arc<dyn PomReader>,
    store: Arc<dyn RepositoryStore>,
}

impl ModuleResolver {
    pub fn new(
        search: ComponentSearch,
        pom_reader: Arc<dyn PomReader>,
        store: Arc<dyn RepositoryStore>,
    ) -> Self {
        Self {
            search,
            pom_reader,
            store,
        }
    }

    /// `component` enriched with the modules the SEARCH repositories hold.
    ///
    /// When no repository knows it, `component` is returned as is only if the
    /// POM of `probe` can be read from a SOURCE repository.
    pub async fn resolve(
        &self,
        component: Component,
        query: &SearchQuery,
        probe: Option<MvnArtifact>,
    ) -> Option<Component> {
        let repositories = self
            .store
            .get_repositories(RepositoryTarget::Search)
            .inspect_err(|e| warn!("Failed to read search repositories: {}", e))
            .unwrap_or_default();

        if let Some(found) = self.search.search_all(&repositories, &component, query).await {
            return Some(found);
        }

        let probe = probe?;
        match self.pom_reader.read_pom(&probe, &Classifier::pom()).await {
            Ok(Some(_)) => Some(component),
            Ok(None) => {
                debug!("{} not found in any repository", component);
                None
            }
            Err(e) => {
                warn!("Failed to read POM of {}: {}", probe, e);
                None
            }
        }
    }

    pub async fn read_pom(
        &self,
        artifact: &MvnArtifact,
        classifier: &Classifier,
    ) -> Result<Option<PomModel>, PomError> {
        self.pom_reader.read_pom(artifact, classifier).await
    }
}
