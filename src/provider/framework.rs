//! CUBA and Jmix platform editions

use std::sync::Arc;

use tracing::{debug, warn};

use crate::model::artifact::MvnArtifact;
use crate::model::classifier::Classifier;
use crate::model::component::Component;
use crate::provider::ComponentProvider;
use crate::provider::addon::VERSION_PLACEHOLDER;
use crate::provider::catalog::ExpansionRule;
use crate::provider::resolver::ModuleResolver;
use crate::provider::templates;
use crate::repository::pom::PomModel;
use crate::repository::search::SearchQuery;
use crate::resources::{CUBA_APP_COMPONENTS, JMIX_APP_COMPONENTS};
use crate::settings::{GRADLE_DOWNLOAD_LINK, Settings};
use crate::version::lookup::VersionLookup;
use crate::version::search::SearchProtocol;
use crate::version::types::VersionOption;

/// Platform family a framework or addon provider serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Framework {
    Cuba,
    Jmix,
}

impl Framework {
    /// Provider type, component id and settings prefix
    pub fn id(&self) -> &'static str {
        match self {
            Framework::Cuba => "cuba",
            Framework::Jmix => "jmix",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Framework::Cuba => "CUBA",
            Framework::Jmix => "Jmix",
        }
    }

    pub fn addon_type(&self) -> &'static str {
        match self {
            Framework::Cuba => "cuba-addon",
            Framework::Jmix => "jmix-addon",
        }
    }

    pub fn addon_name(&self) -> &'static str {
        match self {
            Framework::Cuba => "CUBA addon",
            Framework::Jmix => "Jmix addon",
        }
    }

    pub fn group_id(&self) -> &'static str {
        match self {
            Framework::Cuba => "com.haulmont.cuba",
            Framework::Jmix => "io.jmix.core",
        }
    }

    pub fn artifact_id(&self) -> &'static str {
        match self {
            Framework::Cuba => "cuba",
            Framework::Jmix => "jmix-core-starter",
        }
    }

    /// `group:artifact` whose published versions are the platform versions
    pub fn version_artifact(&self) -> &'static str {
        match self {
            Framework::Cuba => "com.haulmont.cuba:cuba-global",
            Framework::Jmix => "io.jmix.core:jmix-core",
        }
    }

    pub fn search_protocol(&self) -> SearchProtocol {
        match self {
            Framework::Cuba => SearchProtocol::Nexus2,
            Framework::Jmix => SearchProtocol::Nexus3,
        }
    }

    /// Bundled marketplace snapshot
    pub fn catalog_resource(&self) -> &'static str {
        match self {
            Framework::Cuba => CUBA_APP_COMPONENTS,
            Framework::Jmix => JMIX_APP_COMPONENTS,
        }
    }

    /// When catalog compatibility lists are rewritten to track platform versions
    pub fn expansion_rule(&self) -> ExpansionRule {
        match self {
            Framework::Cuba => ExpansionRule::Sentinel("$cubaVersion"),
            Framework::Jmix => ExpansionRule::Always,
        }
    }

    /// Build plugin POM whose properties and dependencies pin the toolchain
    fn bom(&self, version: &str) -> (MvnArtifact, Classifier) {
        match self {
            Framework::Cuba => (
                MvnArtifact::new("com.haulmont.gradle", "cuba-plugin", version),
                Classifier::sdk(),
            ),
            Framework::Jmix => (
                MvnArtifact::new("io.jmix.build", "io.jmix.build.gradle.plugin", version),
                Classifier::pom(),
            ),
        }
    }

    fn search_query(&self, version: &str) -> SearchQuery {
        match self {
            Framework::Cuba => SearchQuery::new(self.group_id(), version, "").wildcard(),
            Framework::Jmix => SearchQuery::new(self.group_id(), version, self.artifact_id()),
        }
    }

    /// Artifact whose POM proves the edition exists
    fn probe(&self, version: &str) -> MvnArtifact {
        match self {
            Framework::Cuba => MvnArtifact::new(self.group_id(), "cuba-global", version),
            Framework::Jmix => MvnArtifact::new(self.group_id(), self.artifact_id(), version),
        }
    }

    fn modules(&self, version: &str) -> Vec<Component> {
        match self {
            Framework::Cuba => templates::cuba_platform_modules(version),
            Framework::Jmix => templates::jmix_platform_modules(version),
        }
    }

    fn libs(&self, version: &str) -> Vec<Component> {
        match self {
            Framework::Cuba => templates::cuba_platform_libs(version),
            Framework::Jmix => templates::jmix_platform_libs(version),
        }
    }
}

/// Platform editions of one framework
pub struct FrameworkProvider {
    framework: Framework,
    lookup: VersionLookup,
    resolver: Arc<ModuleResolver>,
    settings: Arc<dyn Settings>,
}

impl FrameworkProvider {
    pub fn new(
        framework: Framework,
        lookup: VersionLookup,
        resolver: Arc<ModuleResolver>,
        settings: Arc<dyn Settings>,
    ) -> Self {
        Self {
            framework,
            lookup: lookup.for_framework(framework.id(), framework.search_protocol()),
            resolver,
            settings,
        }
    }

    pub fn framework(&self) -> Framework {
        self.framework
    }

    pub fn resolver(&self) -> &Arc<ModuleResolver> {
        &self.resolver
    }

    /// Platform versions already cached, without a remote lookup
    pub fn cached_versions(&self) -> Vec<VersionOption> {
        self.lookup.cached_versions(self.framework.version_artifact())
    }

    fn edition(&self, version: &str) -> Component {
        Component::new(self.framework.group_id(), self.framework.artifact_id(), version)
            .with_type(self.framework.id())
            .with_name(self.framework.display_name())
    }

    async fn bom_components(&self, version: &str) -> Vec<Component> {
        let (artifact, classifier) = self.framework.bom(version);
        let Ok(model) = self
            .resolver
            .read_pom(&artifact, &classifier)
            .await
            .inspect_err(|e| warn!("Failed to read {}: {}", artifact, e))
        else {
            return Vec::new();
        };
        let Some(model) = model else {
            debug!("No build plugin POM for {} {}", self.framework.display_name(), version);
            return Vec::new();
        };

        bom_components(&model, self.settings.get(GRADLE_DOWNLOAD_LINK).as_deref())
    }
}

/// Toolchain components pinned by a build plugin POM
fn bom_components(model: &PomModel, gradle_download_link: Option<&str>) -> Vec<Component> {
    let mut components = Vec::new();

    if let Some(tomcat) = model.property("tomcat.version") {
        components.push(
            Component::new("org.apache.tomcat", "tomcat", tomcat)
                .with_classifiers([Classifier::pom(), Classifier::with_extension("", "zip")]),
        );
    }

    if let Some(gradle) = model.property("gradle.version") {
        let mut component = Component::new("gradle", "gradle", gradle)
            .with_classifiers([Classifier::with_extension("", "zip")]);
        component.url = gradle_download_link.map(|link| link.replace("%s", gradle));
        components.push(component);
    }

    for dependency in model.dependencies() {
        match model.dependency_version(dependency) {
            Some(version) => components.push(Component::new(
                &dependency.group_id,
                &dependency.artifact_id,
                &version,
            )),
            None => debug!(
                "Skipping {}:{} without a resolvable version",
                dependency.group_id, dependency.artifact_id
            ),
        }
    }

    components
}

#[async_trait::async_trait]
impl ComponentProvider for FrameworkProvider {
    fn name(&self) -> &'static str {
        self.framework.display_name()
    }

    fn provider_type(&self) -> &'static str {
        self.framework.id()
    }

    /// The platform version list; the requested id is ignored
    async fn versions(&self, _component_id: Option<&str>) -> Vec<VersionOption> {
        self.lookup
            .versions(Some(self.framework.version_artifact()))
            .await
    }

    /// A single edition template, versioned with the placeholder
    async fn components(&self) -> Option<Vec<Component>> {
        Some(vec![self.edition(VERSION_PLACEHOLDER).with_id(self.framework.id())])
    }

    /// Accepts `version` or `<framework>:version`
    fn resolve_coordinates(&self, coordinates: &str) -> Option<Component> {
        let segments: Vec<&str> = coordinates.split(':').collect();
        match segments.as_slice() {
            [version] | [_, version] if !version.is_empty() => Some(self.edition(version)),
            _ => None,
        }
    }

    async fn create_from_template(&self, template: &Component) -> Option<Component> {
        let version = template.version.as_str();
        let mut component = self.edition(version).with_id(self.framework.id());
        component.framework_version = Some(version.to_string());
        let component = component
            .with_components(self.framework.modules(version))
            .with_components(self.framework.libs(version))
            .with_components(self.bom_components(version).await);

        self.resolver
            .resolve(
                component,
                &self.framework.search_query(version),
                Some(self.framework.probe(version)),
            )
            .await
    }
}
