//! Marketplace addons for CUBA and Jmix
//!
//! CUBA addons are named by their global module (`reports-global`) and are
//! made of the standard addon module layout. Jmix addons are consumed through
//! starters, the first of which names the addon.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::model::artifact::MvnArtifact;
use crate::model::classifier::Classifier;
use crate::model::component::{Component, GLOBAL_MODULE_SUFFIX, STARTER_MODULE_SUFFIX, global_module};
use crate::model::marketplace::MarketplaceAddon;
use crate::model::version::Version;
use crate::provider::catalog::AddonCatalog;
use crate::provider::error::ProviderError;
use crate::provider::framework::{Framework, FrameworkProvider};
use crate::provider::{ComponentProvider, templates};
use crate::repository::pom::PomModel;
use crate::repository::search::SearchQuery;
use crate::settings::{JMIX_IGNORED_ADDONS, Settings};
use crate::version::types::VersionOption;

/// Version placeholder of catalog templates
pub const VERSION_PLACEHOLDER: &str = "${version}";

pub struct AddonProvider {
    platform: Arc<FrameworkProvider>,
    catalog: AddonCatalog,
    settings: Arc<dyn Settings>,
}

/// `name` without the first `-global` and anything after it
fn strip_global(name: &str) -> &str {
    name.split(GLOBAL_MODULE_SUFFIX).next().unwrap_or(name)
}

/// Ordering of version strings: numerically where both parse, lexically otherwise
fn compare_versions(a: &str, b: &str) -> Ordering {
    fn key(raw: &str) -> Option<((u64, u64), u32)> {
        let version = Version::parse(raw)?;
        Some((version.major_key(), version.minor.unwrap_or(0)))
    }
    match (key(a), key(b)) {
        (Some(ka), Some(kb)) => ka.cmp(&kb).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

impl AddonProvider {
    pub fn new(platform: Arc<FrameworkProvider>, catalog: AddonCatalog, settings: Arc<dyn Settings>) -> Self {
        Self {
            platform,
            catalog,
            settings,
        }
    }

    fn framework(&self) -> Framework {
        self.platform.framework()
    }

    /// Catalog entries; offline data when the background load hasn't finished
    fn addons(&self) -> Arc<Vec<MarketplaceAddon>> {
        let platform_versions: Vec<String> = self
            .platform
            .cached_versions()
            .into_iter()
            .map(|v| v.id)
            .collect();

        self.catalog
            .addons(&platform_versions)
            .inspect_err(|e| warn!("{} catalog unavailable: {}", self.framework().display_name(), e))
            .unwrap_or_default()
    }

    fn find_in_marketplace(
        &self,
        id: Option<&str>,
        group_id: Option<&str>,
        artifact_id: Option<&str>,
    ) -> Option<MarketplaceAddon> {
        let framework = self.framework();
        self.addons()
            .iter()
            .find(|addon| {
                if id.is_some_and(|id| addon.id == id) {
                    return true;
                }
                let (Some(group_id), Some(artifact_id)) = (group_id, artifact_id) else {
                    return false;
                };
                match framework {
                    Framework::Cuba => {
                        addon.group_id == group_id
                            && (addon.artifact_id == artifact_id
                                || addon.artifact_id == format!("{}{}", artifact_id, GLOBAL_MODULE_SUFFIX))
                    }
                    Framework::Jmix => addon
                        .dependencies
                        .first()
                        .is_some_and(|d| d.group == group_id && d.name == artifact_id),
                }
            })
            .cloned()
    }

    /// Component built from a catalog entry
    fn template(&self, addon: &MarketplaceAddon, version: &str) -> Option<Component> {
        let (group_id, artifact_id, modules) = match self.framework() {
            Framework::Cuba => {
                let name = strip_global(&addon.artifact_id);
                let modules = templates::cuba_addon_modules(Some(&addon.id), &addon.group_id, name, version);
                (addon.group_id.clone(), name.to_string(), modules)
            }
            Framework::Jmix => {
                let main = addon.dependencies.first()?;
                let mut modules = templates::jmix_addon_modules(version);
                modules.extend(
                    addon
                        .dependencies
                        .iter()
                        .map(|d| Component::new(&d.group, &d.name, version)),
                );
                if addon.id == "bpm" {
                    modules.push(Component::new(&main.group, "jmix-bpm-modeler", version));
                }
                (main.group.clone(), main.name.clone(), modules)
            }
        };

        let mut component = Component::new(&group_id, &artifact_id, version)
            .with_type(self.provider_type())
            .with_id(&addon.id)
            .with_name(&addon.name)
            .with_components(modules);
        component.description = Some(addon.description.clone()).filter(|d| !d.is_empty());
        component.category = Some(addon.category.clone()).filter(|c| !c.is_empty());
        Some(component)
    }

    /// Component for an addon the marketplace doesn't know
    fn ad_hoc(&self, group_id: &str, artifact_id: &str, version: &str) -> Component {
        match self.framework() {
            Framework::Cuba => {
                let name = strip_global(artifact_id);
                Component::new(group_id, name, version)
                    .with_type(self.provider_type())
                    .with_components(templates::cuba_addon_modules(None, group_id, name, version))
            }
            Framework::Jmix => Component::new(group_id, artifact_id, version).with_type(self.provider_type()),
        }
    }

    fn search_query(&self, component: &Component) -> SearchQuery {
        let query = SearchQuery::new(&component.group_id, &component.version, &component.artifact_id);
        match self.framework() {
            Framework::Cuba => query.wildcard(),
            Framework::Jmix => query,
        }
    }

    /// Artifact whose POM proves `component` exists and lists its dependencies
    fn probe(&self, component: &Component) -> Option<MvnArtifact> {
        match self.framework() {
            Framework::Cuba => global_module(component)
                .map(|global| MvnArtifact::new(&global.group_id, &global.artifact_id, &global.version)),
            Framework::Jmix => Some(MvnArtifact::new(
                &component.group_id,
                &component.artifact_id,
                &component.version,
            )),
        }
    }

    /// Dependencies of `model` that are addons themselves, as templates
    fn nested_addon_templates(&self, model: &PomModel) -> Vec<Component> {
        let framework = self.framework();
        model
            .dependencies()
            .iter()
            .filter(|dependency| match framework {
                Framework::Cuba => {
                    dependency.artifact_id.ends_with(GLOBAL_MODULE_SUFFIX)
                        && !dependency.artifact_id.starts_with("cuba")
                }
                Framework::Jmix => dependency.artifact_id.ends_with(STARTER_MODULE_SUFFIX),
            })
            .filter_map(|dependency| {
                let version = model.dependency_version(dependency)?;
                let artifact_id = match framework {
                    Framework::Cuba => dependency
                        .artifact_id
                        .strip_suffix(GLOBAL_MODULE_SUFFIX)
                        .unwrap_or(&dependency.artifact_id),
                    Framework::Jmix => dependency.artifact_id.as_str(),
                };
                Some(Component::new(&dependency.group_id, artifact_id, &version))
            })
            .collect()
    }

    fn framework_version_of(&self, model: &PomModel) -> Option<String> {
        match self.framework() {
            Framework::Cuba => model
                .dependencies()
                .iter()
                .find(|d| d.artifact_id == "cuba-global")
                .and_then(|d| model.dependency_version(d)),
            Framework::Jmix => model.project_version().map(str::to_string),
        }
    }
}

#[async_trait::async_trait]
impl ComponentProvider for AddonProvider {
    fn name(&self) -> &'static str {
        self.framework().addon_name()
    }

    fn provider_type(&self) -> &'static str {
        self.framework().addon_type()
    }

    async fn components(&self) -> Option<Vec<Component>> {
        let ignored: Vec<String> = match self.framework() {
            Framework::Cuba => Vec::new(),
            Framework::Jmix => self
                .settings
                .get(JMIX_IGNORED_ADDONS)
                .map(|value| {
                    value
                        .split(',')
                        .map(|id| id.trim().to_string())
                        .filter(|id| !id.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        };

        let mut addons: Vec<MarketplaceAddon> = self
            .addons()
            .iter()
            .filter(|addon| !ignored.contains(&addon.id))
            .cloned()
            .collect();
        addons.sort_by(|a, b| a.id.cmp(&b.id));

        Some(
            addons
                .iter()
                .filter_map(|addon| self.template(addon, VERSION_PLACEHOLDER))
                .collect(),
        )
    }

    async fn versions(&self, component_id: Option<&str>) -> Vec<VersionOption> {
        let Some(component_id) = component_id else {
            return Vec::new();
        };
        let label = self.framework().display_name();

        let mut versions: Vec<VersionOption> = self
            .addons()
            .iter()
            .filter(|addon| addon.id == component_id)
            .flat_map(|addon| {
                addon
                    .artifact_versions()
                    .map(|(version, platform)| {
                        VersionOption::labelled(version, format!("{} [{} {}]", version, label, platform))
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        versions.sort_by(|a, b| compare_versions(&b.value, &a.value));
        versions
    }

    /// `group:artifact:version` (marketplace entry or ad hoc) or `addonId:version`
    fn resolve_coordinates(&self, coordinates: &str) -> Option<Component> {
        let segments: Vec<&str> = coordinates.split(':').collect();
        match segments.as_slice() {
            [group_id, artifact_id, version] => {
                match self.find_in_marketplace(None, Some(*group_id), Some(*artifact_id)) {
                    Some(addon) => self.template(&addon, version),
                    None => Some(self.ad_hoc(group_id, artifact_id, version)),
                }
            }
            [id, version] => {
                let addon = self.find_in_marketplace(Some(*id), None, None)?;
                self.template(&addon, version)
            }
            _ => None,
        }
    }

    async fn create_from_template(&self, template: &Component) -> Option<Component> {
        let from_marketplace = self
            .find_in_marketplace(
                template.id.as_deref(),
                Some(&template.group_id),
                Some(&template.artifact_id),
            )
            .and_then(|addon| self.template(&addon, &template.version));

        let component = from_marketplace.unwrap_or_else(|| {
            let mut component = self.ad_hoc(&template.group_id, &template.artifact_id, &template.version);
            component.id = template.id.clone();
            component.name = template.name.clone();
            component
        });

        let query = self.search_query(&component);
        let probe = self.probe(&component);
        self.platform.resolver().resolve(component, &query, probe).await
    }

    async fn search_additional_components(
        &self,
        component: &mut Component,
    ) -> Result<BTreeSet<Component>, ProviderError> {
        let mut additional = BTreeSet::new();
        let Some(descriptor) = self.probe(component) else {
            return Ok(additional);
        };

        let Some(model) = self
            .platform
            .resolver()
            .read_pom(&descriptor, &Classifier::pom())
            .await?
        else {
            info!("Component not found: {}", component);
            return Err(ProviderError::ComponentNotFound(component.to_string()));
        };

        component.framework_version = self.framework_version_of(&model);

        for template in self.nested_addon_templates(&model) {
            let Some(mut addon) = self.create_from_template(&template).await else {
                debug!("Dependency {} of {} is not an addon", template, component);
                continue;
            };
            let nested = self.search_additional_components(&mut addon).await?;
            additional.insert(addon);
            additional.extend(nested);
        }

        Ok(additional)
    }

    async fn load(&self) -> Result<(), ProviderError> {
        let platform_versions: Vec<String> = self
            .platform
            .versions(None)
            .await
            .into_iter()
            .map(|v| v.id)
            .collect();
        self.catalog.load(&platform_versions).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{FetchError, MockHttpFetcher};
    use crate::model::marketplace::{AddonCompatibility, AddonDependency};
    use crate::model::repository::{Repository, RepositoryTarget, RepositoryType};
    use crate::provider::resolver::ModuleResolver;
    use crate::repository::memory::MemoryRepositoryStore;
    use crate::repository::pom::MockPomReader;
    use crate::repository::search::ComponentSearch;
    use crate::resources::BundledResources;
    use crate::settings::{SKIP_VERSION_LOADING, SdkSettings};
    use crate::version::cache::{ManualClock, VersionCache};
    use crate::version::lookup::VersionLookup;
    use crate::version::search::VersionSearch;
    use rstest::rstest;

    const CUBA_SEARCH: &str = r#"{"data": [{"version": "7.2.10"}, {"version": "7.1.8"}]}"#;

    fn failing_fetcher() -> MockHttpFetcher {
        let mut fetcher = MockHttpFetcher::new();
        fetcher.expect_get().returning(|request| {
            Err(FetchError::UnexpectedStatus {
                status: 404,
                url: request.url,
            })
        });
        fetcher
    }

    fn provider(framework: Framework, fetcher: MockHttpFetcher, pom_reader: MockPomReader, settings: SdkSettings) -> AddonProvider {
        let fetcher = Arc::new(fetcher);
        let settings: Arc<dyn Settings> = Arc::new(settings.with_property(SKIP_VERSION_LOADING, "true"));
        let store = Arc::new(
            MemoryRepositoryStore::new()
                .with_repository(
                    RepositoryTarget::Search,
                    Repository::new("cuba", RepositoryType::Nexus2, "https://nexus2.invalid/search"),
                )
                .with_repository(
                    RepositoryTarget::Search,
                    Repository::new("jmix", RepositoryType::Nexus3, "https://nexus3.invalid/search"),
                ),
        );
        let lookup = VersionLookup::new(
            VersionSearch::new(fetcher.clone()),
            settings.clone(),
            store.clone(),
            VersionCache::new(60_000, Arc::new(ManualClock::new(0))),
        );
        let resolver = ModuleResolver::new(ComponentSearch::new(fetcher.clone()), Arc::new(pom_reader), store);
        let platform = Arc::new(FrameworkProvider::new(
            framework,
            lookup,
            Arc::new(resolver),
            settings.clone(),
        ));
        let catalog = AddonCatalog::new(framework, settings.clone(), Arc::new(BundledResources), fetcher);
        AddonProvider::new(platform, catalog, settings)
    }

    fn cuba(fetcher: MockHttpFetcher, pom_reader: MockPomReader) -> AddonProvider {
        provider(Framework::Cuba, fetcher, pom_reader, SdkSettings::default())
    }

    #[rstest]
    #[case("7.2.3", "7.10.0", Ordering::Less)]
    #[case("1.2.1", "1.2.0", Ordering::Greater)]
    #[case("1.10", "1.9.5", Ordering::Greater)]
    #[case("abc", "abd", Ordering::Less)]
    fn versions_compare_numerically(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(compare_versions(a, b), expected);
    }

    #[test]
    fn strip_global_cuts_at_suffix() {
        assert_eq!(strip_global("reports-global"), "reports");
        assert_eq!(strip_global("reports"), "reports");
    }

    #[tokio::test]
    async fn versions_are_labelled_and_sorted() {
        let provider = cuba(failing_fetcher(), MockPomReader::new());

        let versions = provider.versions(Some("bproc")).await;

        assert_eq!(
            versions.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
            vec!["1.2.1 [CUBA 7.2]", "1.2.0 [CUBA 7.2]", "1.1.3 [CUBA 7.1]"]
        );
        assert!(provider.versions(None).await.is_empty());
        assert!(provider.versions(Some("unknown")).await.is_empty());
    }

    #[tokio::test]
    async fn load_expands_catalog_against_platform_versions() {
        let mut fetcher = MockHttpFetcher::new();
        fetcher
            .expect_get()
            .withf(|request| request.url == "https://nexus2.invalid/search")
            .times(1)
            .returning(|_| Ok(CUBA_SEARCH.to_string()));
        let provider = cuba(fetcher, MockPomReader::new());

        provider.load().await.unwrap();
        let versions = provider.versions(Some("reports")).await;

        assert_eq!(
            versions.iter().map(|v| v.name.as_str()).collect::<Vec<_>>(),
            vec!["7.2.10 [CUBA 7.2.10]", "7.1.8 [CUBA 7.1.8]"]
        );
    }

    #[test]
    fn coordinates_match_marketplace_or_fall_back_to_ad_hoc() {
        let provider = cuba(failing_fetcher(), MockPomReader::new());

        let known = provider
            .resolve_coordinates("com.haulmont.addon.bproc:bproc:1.2.1")
            .unwrap();
        let by_id = provider.resolve_coordinates("bproc:1.2.1").unwrap();
        let ad_hoc = provider
            .resolve_coordinates("com.example:widgets-global:1.0")
            .unwrap();

        assert_eq!(known, by_id);
        assert_eq!(known.id.as_deref(), Some("bproc"));
        assert!(known.components.iter().any(|c| c.artifact_id == "bproc-modeler"));
        assert_eq!(ad_hoc.artifact_id, "widgets");
        assert_eq!(ad_hoc.id, None);
        assert_eq!(ad_hoc.component_type, "cuba-addon");
        assert_eq!(provider.resolve_coordinates("unknown:1.0"), None);
        assert_eq!(provider.resolve_coordinates("a:b:c:d"), None);
    }

    #[tokio::test]
    async fn components_are_sorted_templates() {
        let provider = cuba(failing_fetcher(), MockPomReader::new());

        let components = provider.components().await.unwrap();

        assert_eq!(
            components.iter().map(|c| c.id.as_deref().unwrap()).collect::<Vec<_>>(),
            vec!["bproc", "maps", "reports"]
        );
        assert!(components.iter().all(|c| c.version == VERSION_PLACEHOLDER));
    }

    #[tokio::test]
    async fn jmix_components_skip_ignored_ids() {
        let settings = SdkSettings::default().with_property(JMIX_IGNORED_ADDONS, "bpm, other");
        let provider = provider(Framework::Jmix, failing_fetcher(), MockPomReader::new(), settings);

        let components = provider.components().await.unwrap();

        assert_eq!(components.len(), 1);
        assert_eq!(components[0].artifact_id, "jmix-reports-starter");
        assert!(components[0]
            .components
            .iter()
            .any(|c| c.artifact_id == "jmix-reports-ui-starter"));
    }

    #[test]
    fn jmix_bpm_template_adds_modeler() {
        let provider = provider(Framework::Jmix, failing_fetcher(), MockPomReader::new(), SdkSettings::default());
        let addon = MarketplaceAddon {
            id: "bpm".to_string(),
            dependencies: vec![AddonDependency {
                group: "io.jmix.bpm".to_string(),
                name: "jmix-bpm-starter".to_string(),
            }],
            compatibility_list: vec![AddonCompatibility::new("1.0", &["1.0.0"])],
            ..Default::default()
        };

        let component = provider.template(&addon, "1.0.0").unwrap();

        assert_eq!(component.group_id, "io.jmix.bpm");
        assert!(component.components.iter().any(|c| c.artifact_id == "jmix-bpm-modeler"));
        assert!(component.components.iter().any(|c| c.artifact_id == "jmix-core-starter"));
    }

    #[tokio::test]
    async fn additional_components_follow_global_dependencies() {
        let mut pom_reader = MockPomReader::new();
        pom_reader
            .expect_read_pom()
            .withf(|artifact, _| artifact.artifact_id == "bproc-global")
            .returning(|_, _| {
                Ok(Some(
                    PomModel::parse(
                        r#"<project><version>1.2.1</version><dependencies>
                            <dependency><groupId>com.haulmont.cuba</groupId><artifactId>cuba-global</artifactId><version>7.2.10</version></dependency>
                            <dependency><groupId>com.haulmont.reports</groupId><artifactId>reports-global</artifactId><version>7.2.10</version></dependency>
                        </dependencies></project>"#,
                        "bproc",
                    )
                    .unwrap(),
                ))
            });
        pom_reader
            .expect_read_pom()
            .withf(|artifact, _| artifact.artifact_id == "reports-global")
            .returning(|_, _| Ok(Some(PomModel::default())));
        let provider = cuba(failing_fetcher(), pom_reader);
        let mut component = provider.resolve_coordinates("bproc:1.2.1").unwrap();

        let additional = provider.search_additional_components(&mut component).await.unwrap();

        assert_eq!(component.framework_version.as_deref(), Some("7.2.10"));
        assert_eq!(additional.len(), 1);
        let reports = additional.iter().next().unwrap();
        assert_eq!(reports.id.as_deref(), Some("reports"));
        assert_eq!(reports.version, "7.2.10");
    }

    #[tokio::test]
    async fn missing_descriptor_is_component_not_found() {
        let mut pom_reader = MockPomReader::new();
        pom_reader.expect_read_pom().returning(|_, _| Ok(None));
        let provider = provider(Framework::Jmix, failing_fetcher(), pom_reader, SdkSettings::default());
        let mut component = provider
            .resolve_coordinates("io.jmix.example:jmix-example-starter:1.0.0")
            .unwrap();

        assert!(matches!(
            provider.search_additional_components(&mut component).await,
            Err(ProviderError::ComponentNotFound(_))
        ));
    }
}
