use crate::model::classifier::Classifier;
use crate::model::component::Component;
use crate::provider::ComponentProvider;
use crate::version::lookup::VersionLookup;
use crate::version::types::VersionOption;

pub const LIB_PROVIDER_TYPE: &str = "lib";

/// Plain Maven libraries given by coordinates
pub struct LibProvider {
    lookup: VersionLookup,
}

impl LibProvider {
    pub fn new(lookup: VersionLookup) -> Self {
        Self { lookup }
    }
}

/// `group:artifact:version[:ext[:type]]` as a bare library component
pub fn parse_coordinates(coordinates: &str) -> Option<Component> {
    let segments: Vec<&str> = coordinates.split(':').collect();

    let component = match segments.as_slice() {
        [group, artifact, version] => Component::new(group, artifact, version),
        [group, artifact, version, extension] => Component::new(group, artifact, version)
            .with_classifiers([Classifier::pom(), Classifier::with_extension("", extension)]),
        [group, artifact, version, extension, classifier_type] => {
            Component::new(group, artifact, version).with_classifiers([
                Classifier::pom(),
                Classifier::with_extension(classifier_type, extension),
            ])
        }
        _ => return None,
    };

    Some(component.with_type(LIB_PROVIDER_TYPE))
}

#[async_trait::async_trait]
impl ComponentProvider for LibProvider {
    fn name(&self) -> &'static str {
        "Library"
    }

    fn provider_type(&self) -> &'static str {
        LIB_PROVIDER_TYPE
    }

    async fn versions(&self, component_id: Option<&str>) -> Vec<VersionOption> {
        self.lookup.versions(component_id).await
    }

    fn resolve_coordinates(&self, coordinates: &str) -> Option<Component> {
        parse_coordinates(coordinates)
    }

    async fn create_from_template(&self, template: &Component) -> Option<Component> {
        Some(
            Component::new(&template.group_id, &template.artifact_id, &template.version)
                .with_id(&format!("{}:{}", template.group_id, template.artifact_id))
                .with_type(LIB_PROVIDER_TYPE)
                .with_classifiers(template.classifiers.iter().cloned()),
        )
    }
}
