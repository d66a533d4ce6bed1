//! Artifact metadata read from POM files held in SOURCE repositories

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::http::{FetchError, HttpFetcher, HttpRequest};
use crate::model::artifact::MvnArtifact;
use crate::model::classifier::Classifier;
use crate::model::repository::{Repository, RepositoryTarget, RepositoryType};
use crate::repository::error::PomError;
use crate::repository::store::RepositoryStore;

/// The parts of a Maven project model the SDK needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PomModel {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub parent: Option<PomParent>,
    pub properties: HashMap<String, String>,
    pub dependencies: PomDependencies,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PomParent {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PomDependencies {
    #[serde(rename = "dependency")]
    pub dependency: Vec<PomDependency>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PomDependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub scope: Option<String>,
}

impl PomModel {
    pub fn parse(content: &str, location: &str) -> Result<Self, PomError> {
        serde_xml_rs::from_str(content).map_err(|e| PomError::Parse {
            location: location.to_string(),
            reason: e.to_string(),
        })
    }

    /// Project version, inherited from the parent when not declared
    pub fn project_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or_else(|| self.parent.as_ref().map(|p| p.version.as_str()))
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|v| v.as_str())
    }

    pub fn dependencies(&self) -> &[PomDependency] {
        &self.dependencies.dependency
    }

    /// Substitutes `${project.version}` and `${<property>}` in `value`.
    /// Returns None if a placeholder cannot be resolved.
    pub fn interpolate(&self, value: &str) -> Option<String> {
        let mut result = String::new();
        let mut rest = value;
        while let Some(start) = rest.find("${") {
            let end = rest[start..].find('}')? + start;
            let name = &rest[start + 2..end];
            let replacement = match name {
                "project.version" | "version" => self.project_version()?,
                _ => self.property(name)?,
            };
            result.push_str(&rest[..start]);
            result.push_str(replacement);
            rest = &rest[end + 1..];
        }
        result.push_str(rest);
        Some(result)
    }

    /// Version of `dependency` with placeholders resolved
    pub fn dependency_version(&self, dependency: &PomDependency) -> Option<String> {
        dependency
            .version
            .as_deref()
            .and_then(|version| self.interpolate(version))
    }
}

/// Reads project models of artifacts
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PomReader: Send + Sync {
    /// The model described by `artifact`'s `classifier` file, None when no repository has it
    async fn read_pom(
        &self,
        artifact: &MvnArtifact,
        classifier: &Classifier,
    ) -> Result<Option<PomModel>, PomError>;
}

/// Looks for POMs in the SOURCE repositories, in order
pub struct RepositoryPomReader {
    store: Arc<dyn RepositoryStore>,
    fetcher: Arc<dyn HttpFetcher>,
}

impl RepositoryPomReader {
    pub fn new(store: Arc<dyn RepositoryStore>, fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self { store, fetcher }
    }

    async fn read_from(
        &self,
        repository: &Repository,
        artifact: &MvnArtifact,
        classifier: &Classifier,
    ) -> Result<Option<String>, PomError> {
        match repository.repository_type {
            RepositoryType::Local => {
                let path = artifact.local_path(Path::new(&repository.url), classifier);
                read_local(&path)
            }
            RepositoryType::Nexus2 | RepositoryType::Nexus3 => {
                let url = format!(
                    "{}/{}",
                    repository.url.trim_end_matches('/'),
                    artifact.repository_path(classifier)
                );
                let request = HttpRequest::get(&url).auth(repository.authentication.as_ref());
                match self.fetcher.get(request).await {
                    Ok(body) => Ok(Some(body)),
                    Err(FetchError::UnexpectedStatus { status: 404, .. }) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            }
        }
    }
}

fn read_local(path: &Path) -> Result<Option<String>, PomError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(PomError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

#[async_trait::async_trait]
impl PomReader for RepositoryPomReader {
    async fn read_pom(
        &self,
        artifact: &MvnArtifact,
        classifier: &Classifier,
    ) -> Result<Option<PomModel>, PomError> {
        let repositories = self.store.get_repositories(RepositoryTarget::Source)?;

        for repository in &repositories {
            let Ok(content) = self
                .read_from(repository, artifact, classifier)
                .await
                .inspect_err(|e| warn!("Failed to read {} from {}: {}", artifact, repository.name, e))
            else {
                continue;
            };

            if let Some(content) = content {
                let location = format!("{} in {}", artifact.mvn_coordinates(Some(classifier)), repository.name);
                debug!("Read POM {}", location);
                return PomModel::parse(&content, &location).map(Some);
            }
        }

        debug!("POM for {} not found in any source repository", artifact);
        Ok(None)
    }
}
