//! Premium repository activation from a license key

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::info;

use crate::model::repository::{Repository, RepositoryTarget, RepositoryType};
use crate::repository::error::StoreError;
use crate::repository::store::RepositoryStore;

pub const CUBA_PREMIUM_REPOSITORY: &str = "cuba-nexus-premium";
pub const CUBA_PREMIUM_URL: &str = "https://repo.cuba-platform.com/content/groups/premium";
pub const JMIX_PREMIUM_REPOSITORY: &str = "jmix-premium";
pub const JMIX_PREMIUM_URL: &str = "https://global.repo.jmix.io/repository/premium/";

static LICENSE_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-zA-Z]+-[0-9a-zA-Z]+$").expect("license key pattern is valid")
});

#[derive(Debug, Error)]
pub enum LicenseError {
    #[error("License key should be form of ************-************")]
    InvalidKey,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Registers the premium SOURCE repositories with credentials taken from `license_key`.
///
/// Existing premium entries are removed first, so re-activation replaces credentials.
pub fn activate_license(
    store: &dyn RepositoryStore,
    license_key: &str,
) -> Result<Vec<Repository>, LicenseError> {
    if !LICENSE_KEY_PATTERN.is_match(license_key) {
        return Err(LicenseError::InvalidKey);
    }
    let (login, password) = license_key
        .split_once('-')
        .ok_or(LicenseError::InvalidKey)?;

    let repositories = vec![
        Repository::new(CUBA_PREMIUM_REPOSITORY, RepositoryType::Nexus2, CUBA_PREMIUM_URL)
            .with_auth(login, password),
        Repository::new(JMIX_PREMIUM_REPOSITORY, RepositoryType::Nexus3, JMIX_PREMIUM_URL)
            .with_auth(login, password),
    ];

    for repository in &repositories {
        store.remove_repository(&repository.name, RepositoryTarget::Source)?;
        store.add_repository(repository.clone(), RepositoryTarget::Source)?;
    }
    info!("Premium repositories configured");

    Ok(repositories)
}
