//! Repository-target routing: which repositories serve SOURCE, TARGET and SEARCH

use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::model::repository::{Repository, RepositoryTarget, RepositoryType};
use crate::repository::error::StoreError;

pub const CUBA_NEXUS_SEARCH_URL: &str = "https://repo.cuba-platform.com/service/local/lucene/search";
pub const CUBA_NEXUS_URL: &str = "https://repo.cuba-platform.com/content/groups/work";
pub const JMIX_NEXUS_SEARCH_URL: &str = "https://global.repo.jmix.io/service/rest/v1/search";
pub const JMIX_PUBLIC_URL: &str = "https://global.repo.jmix.io/repository/public/";
pub const MAVEN_CENTRAL_URL: &str = "https://repo1.maven.org/maven2/";

/// Ordered repository sets keyed by target. Names are unique per target,
/// compared through [`repository_id`].
#[cfg_attr(test, automock)]
pub trait RepositoryStore: Send + Sync {
    /// Active repositories of `target` in insertion order
    fn get_repositories(&self, target: RepositoryTarget) -> Result<Vec<Repository>, StoreError>;

    /// Finds a repository by name, active or not
    fn get_repository(
        &self,
        name: &str,
        target: RepositoryTarget,
    ) -> Result<Option<Repository>, StoreError>;

    /// Inserts `repository`, replacing one with the same name in place
    fn add_repository(
        &self,
        repository: Repository,
        target: RepositoryTarget,
    ) -> Result<(), StoreError>;

    /// Removes the named repository; absent names are a no-op
    fn remove_repository(&self, name: &str, target: RepositoryTarget) -> Result<(), StoreError>;
}

/// `<target>.<name>` with the name lowercased and whitespace runs collapsed
pub fn repository_id(target: RepositoryTarget, name: &str) -> String {
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("{}.{}", target.id(), name.to_lowercase())
}

/// Repository set a fresh installation starts with
pub fn default_repositories(local_repository: &Path) -> Vec<(RepositoryTarget, Vec<Repository>)> {
    let local_url = local_repository.display().to_string();
    vec![
        (
            RepositoryTarget::Search,
            vec![
                Repository::new("local", RepositoryType::Local, &local_url),
                Repository::new("cuba-nexus", RepositoryType::Nexus2, CUBA_NEXUS_SEARCH_URL)
                    .with_auth("cuba", "cuba123"),
                Repository::new("jmix-nexus", RepositoryType::Nexus3, JMIX_NEXUS_SEARCH_URL),
            ],
        ),
        (
            RepositoryTarget::Source,
            vec![
                Repository::new("local", RepositoryType::Local, &local_url),
                Repository::new("maven-central", RepositoryType::Nexus2, MAVEN_CENTRAL_URL),
                Repository::new("cuba-nexus", RepositoryType::Nexus2, CUBA_NEXUS_URL)
                    .with_auth("cuba", "cuba123"),
                Repository::new("jmix-public", RepositoryType::Nexus3, JMIX_PUBLIC_URL),
            ],
        ),
        (RepositoryTarget::Target, Vec::new()),
    ]
}
