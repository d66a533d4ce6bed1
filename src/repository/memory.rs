use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use indexmap::IndexMap;
use tracing::debug;

use crate::model::repository::{Repository, RepositoryTarget};
use crate::repository::error::StoreError;
use crate::repository::store::{RepositoryStore, default_repositories, repository_id};

type Targets = HashMap<RepositoryTarget, IndexMap<String, Repository>>;

/// Ephemeral repository store; nothing survives the process
#[derive(Debug, Default)]
pub struct MemoryRepositoryStore {
    targets: Mutex<Targets>,
}

impl MemoryRepositoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the default repository set
    pub fn with_defaults(local_repository: &Path) -> Self {
        let store = Self::new();
        {
            let mut targets = store.targets.lock().unwrap_or_else(|e| e.into_inner());
            for (target, repositories) in default_repositories(local_repository) {
                let entries = targets.entry(target).or_default();
                for repository in repositories {
                    entries.insert(repository_id(target, &repository.name), repository);
                }
            }
        }
        store
    }

    pub fn with_repository(self, target: RepositoryTarget, repository: Repository) -> Self {
        if let Ok(mut targets) = self.targets.lock() {
            targets
                .entry(target)
                .or_default()
                .insert(repository_id(target, &repository.name), repository);
        }
        self
    }

    fn lock_targets(&self) -> Result<MutexGuard<'_, Targets>, StoreError> {
        self.targets.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl RepositoryStore for MemoryRepositoryStore {
    fn get_repositories(&self, target: RepositoryTarget) -> Result<Vec<Repository>, StoreError> {
        let targets = self.lock_targets()?;
        Ok(targets
            .get(&target)
            .map(|entries| entries.values().filter(|r| r.active).cloned().collect())
            .unwrap_or_default())
    }

    fn get_repository(
        &self,
        name: &str,
        target: RepositoryTarget,
    ) -> Result<Option<Repository>, StoreError> {
        let targets = self.lock_targets()?;
        Ok(targets
            .get(&target)
            .and_then(|entries| entries.get(&repository_id(target, name)))
            .cloned())
    }

    fn add_repository(
        &self,
        repository: Repository,
        target: RepositoryTarget,
    ) -> Result<(), StoreError> {
        debug!("Adding repository {} to {}", repository.name, target);
        let mut targets = self.lock_targets()?;
        targets
            .entry(target)
            .or_default()
            .insert(repository_id(target, &repository.name), repository);
        Ok(())
    }

    fn remove_repository(&self, name: &str, target: RepositoryTarget) -> Result<(), StoreError> {
        let mut targets = self.lock_targets()?;
        if let Some(entries) = targets.get_mut(&target) {
            if entries.shift_remove(&repository_id(target, name)).is_some() {
                debug!("Removed repository {} from {}", name, target);
            }
        }
        Ok(())
    }
}
