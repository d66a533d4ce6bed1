//! Module discovery: enrich a component template with the modules a SEARCH repository holds

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::http::{HttpFetcher, HttpRequest};
use crate::model::classifier::Classifier;
use crate::model::component::Component;
use crate::model::repository::{Repository, RepositoryType};

const CHECKSUM_EXTENSIONS: &[&str] = &["md5", "sha1", "sha256", "sha512", "asc"];

/// What to look for: modules of `group_id` at `version` whose artifactId starts with `module_prefix`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub group_id: String,
    pub version: String,
    pub module_prefix: String,
    /// Append `*` to the Nexus3 name filter
    pub wildcard: bool,
}

impl SearchQuery {
    pub fn new(group_id: &str, version: &str, module_prefix: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            version: version.to_string(),
            module_prefix: module_prefix.to_string(),
            wildcard: false,
        }
    }

    pub fn wildcard(mut self) -> Self {
        self.wildcard = true;
        self
    }

    fn accepts(&self, artifact_id: &str) -> bool {
        artifact_id.starts_with(&self.module_prefix)
    }
}

#[derive(Debug, Deserialize)]
struct Nexus2SearchResponse {
    #[serde(default)]
    data: Vec<Nexus2Hit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Nexus2Hit {
    group_id: String,
    artifact_id: String,
    latest_release: Option<String>,
    version: Option<String>,
    #[serde(default)]
    artifact_hits: Vec<Nexus2ArtifactHit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Nexus2ArtifactHit {
    #[serde(default)]
    artifact_links: Vec<Nexus2ArtifactLink>,
}

#[derive(Debug, Deserialize)]
struct Nexus2ArtifactLink {
    classifier: Option<String>,
    extension: String,
}

#[derive(Debug, Deserialize)]
struct Nexus3SearchResponse {
    #[serde(default)]
    items: Vec<Nexus3Item>,
}

#[derive(Debug, Deserialize)]
struct Nexus3Item {
    group: String,
    name: String,
    version: String,
    #[serde(default)]
    assets: Vec<Nexus3Asset>,
}

#[derive(Debug, Deserialize)]
struct Nexus3Asset {
    path: String,
}

/// Classifier encoded in `file_name` after the `{artifact_id}-{version}` stem.
///
/// `cuba-web-7.2.3-web.zip` gives (`web`, `zip`); checksum and signature files give None.
pub fn classifier_from_file_name(file_name: &str, artifact_id: &str, version: &str) -> Option<Classifier> {
    let stem = format!("{}-{}", artifact_id, version);
    let rest = file_name.strip_prefix(&stem)?;

    let (classifier_type, extension) = if let Some(ext) = rest.strip_prefix('.') {
        ("", ext)
    } else {
        rest.strip_prefix('-')?.split_once('.')?
    };

    let last_extension = extension.rsplit('.').next().unwrap_or(extension);
    if extension.is_empty() || CHECKSUM_EXTENSIONS.contains(&last_extension) {
        return None;
    }

    Some(Classifier::with_extension(classifier_type, extension))
}

/// Searches repositories for the modules of a component
#[derive(Clone)]
pub struct ComponentSearch {
    fetcher: Arc<dyn HttpFetcher>,
}

impl ComponentSearch {
    pub fn new(fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self { fetcher }
    }

    /// Tries `repositories` in order; the first one yielding modules wins
    pub async fn search_all(
        &self,
        repositories: &[Repository],
        component: &Component,
        query: &SearchQuery,
    ) -> Option<Component> {
        for repository in repositories {
            if let Some(found) = self.search(repository, component, query).await {
                return Some(found);
            }
        }
        None
    }

    /// A copy of `component` with the modules found in `repository` added.
    /// Modules equivalent to an existing child are not added twice. A search
    /// with hits counts as found even when no hit qualifies as a module.
    pub async fn search(
        &self,
        repository: &Repository,
        component: &Component,
        query: &SearchQuery,
    ) -> Option<Component> {
        let modules = match repository.repository_type {
            RepositoryType::Local => {
                Some(search_local(Path::new(&repository.url), query)).filter(|m| !m.is_empty())
            }
            RepositoryType::Nexus2 => self.search_nexus2(repository, query).await,
            RepositoryType::Nexus3 => self.search_nexus3(repository, query).await,
        };

        let Some(modules) = modules else {
            debug!("{} not found in {}", component, repository.name);
            return None;
        };

        let mut resolved = component.clone();
        for module in modules {
            if !resolved.has_module(&module) {
                resolved.components.insert(module);
            }
        }
        info!("{} found in {}", component, repository.name);
        Some(resolved)
    }

    /// None when the search failed or had no hits
    async fn search_nexus2(&self, repository: &Repository, query: &SearchQuery) -> Option<Vec<Component>> {
        let request = search_request(repository)
            .query("g", &query.group_id)
            .query("a", &query.module_prefix)
            .query("v", &query.version);

        let response = self
            .fetch_json::<Nexus2SearchResponse>(request, repository)
            .await
            .filter(|response| !response.data.is_empty())?;

        let modules = response
            .data
            .into_iter()
            .filter(|hit| query.accepts(&hit.artifact_id))
            .filter_map(|hit| {
                let version = hit.latest_release.or(hit.version)?;
                let classifiers: BTreeSet<Classifier> = hit
                    .artifact_hits
                    .iter()
                    .flat_map(|h| h.artifact_links.iter())
                    .map(|link| {
                        Classifier::with_extension(
                            link.classifier.as_deref().unwrap_or(""),
                            &link.extension,
                        )
                    })
                    .collect();
                Some(
                    Component::new(&hit.group_id, &hit.artifact_id, &version)
                        .with_classifiers(classifiers),
                )
            })
            .collect();
        Some(modules)
    }

    async fn search_nexus3(&self, repository: &Repository, query: &SearchQuery) -> Option<Vec<Component>> {
        let name = if query.wildcard {
            format!("{}*", query.module_prefix)
        } else {
            query.module_prefix.clone()
        };
        let mut request = search_request(repository)
            .query("group", &query.group_id)
            .query("name", &name)
            .query("version", &query.version);
        if !repository.repository_name.is_empty() {
            request = request.query("repository", &repository.repository_name);
        }

        let response = self
            .fetch_json::<Nexus3SearchResponse>(request, repository)
            .await
            .filter(|response| !response.items.is_empty())?;

        let modules = response
            .items
            .into_iter()
            .filter(|item| query.accepts(&item.name))
            .map(|item| {
                let classifiers: BTreeSet<Classifier> = item
                    .assets
                    .iter()
                    .filter_map(|asset| {
                        let file_name = asset.path.rsplit('/').next().unwrap_or(&asset.path);
                        classifier_from_file_name(file_name, &item.name, &item.version)
                    })
                    .collect();
                Component::new(&item.group, &item.name, &item.version).with_classifiers(classifiers)
            })
            .collect();
        Some(modules)
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        request: HttpRequest,
        repository: &Repository,
    ) -> Option<T> {
        let body = self
            .fetcher
            .get(request)
            .await
            .inspect_err(|e| warn!("Search in {} failed: {}", repository.name, e))
            .ok()?;

        serde_json::from_str(&body)
            .inspect_err(|e| warn!("Invalid search response from {}: {}", repository.name, e))
            .ok()
    }
}

fn search_request(repository: &Repository) -> HttpRequest {
    HttpRequest::get(&repository.url)
        .header("Accept", "application/json")
        .header("Cache-Control", "no-cache")
        .auth(repository.authentication.as_ref())
}

/// Walks `<root>/<group path>/<artifact>/<version>/` directories
fn search_local(root: &Path, query: &SearchQuery) -> Vec<Component> {
    let group_dir: PathBuf = query.group_id.split('.').fold(root.to_path_buf(), |p, s| p.join(s));

    let Ok(entries) = std::fs::read_dir(&group_dir) else {
        debug!("No local group directory {:?}", group_dir);
        return Vec::new();
    };

    let mut modules = Vec::new();
    for entry in entries.flatten() {
        let artifact_id = entry.file_name().to_string_lossy().to_string();
        let version_dir = entry.path().join(&query.version);
        if !query.accepts(&artifact_id) || !version_dir.is_dir() {
            continue;
        }

        let classifiers: BTreeSet<Classifier> = std::fs::read_dir(&version_dir)
            .map(|files| {
                files
                    .flatten()
                    .filter_map(|file| {
                        classifier_from_file_name(
                            &file.file_name().to_string_lossy(),
                            &artifact_id,
                            &query.version,
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        modules.push(
            Component::new(&query.group_id, &artifact_id, &query.version).with_classifiers(classifiers),
        );
    }
    modules.sort();
    modules
}
