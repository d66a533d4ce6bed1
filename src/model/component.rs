use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::artifact::MvnArtifact;
use crate::model::classifier::Classifier;

/// Suffix of the module carrying a CUBA component's shared classes
pub const GLOBAL_MODULE_SUFFIX: &str = "-global";

/// Suffix of the module a Jmix component is consumed through
pub const STARTER_MODULE_SUFFIX: &str = "-starter";

/// A named, versioned and possibly composite unit: platform edition, addon or plain library.
///
/// `components` holds child modules and `dependencies` the Maven artifacts that
/// must be materialised alongside it. Both are owned, so `clone()` is deep.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Type of the provider that produced this component
    #[serde(rename = "type", default)]
    pub component_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Platform version a framework or addon component is built against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework_version: Option<String>,
    #[serde(default = "Classifier::default_set")]
    pub classifiers: BTreeSet<Classifier>,
    #[serde(default)]
    pub components: BTreeSet<Component>,
    #[serde(default)]
    pub dependencies: BTreeSet<MvnArtifact>,
}

impl Component {
    /// Component with the default classifier set and no children
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
            id: None,
            component_type: String::new(),
            name: None,
            description: None,
            category: None,
            url: None,
            framework_version: None,
            classifiers: Classifier::default_set(),
            components: BTreeSet::new(),
            dependencies: BTreeSet::new(),
        }
    }

    pub fn with_type(mut self, component_type: &str) -> Self {
        self.component_type = component_type.to_string();
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Replaces the classifier set
    pub fn with_classifiers(mut self, classifiers: impl IntoIterator<Item = Classifier>) -> Self {
        self.classifiers = classifiers.into_iter().collect();
        self
    }

    pub fn with_components(mut self, components: impl IntoIterator<Item = Component>) -> Self {
        self.components.extend(components);
        self
    }

    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = MvnArtifact>) -> Self {
        self.dependencies.extend(dependencies);
        self
    }

    /// Identity comparison over type, artifactId, groupId and version; nested structure is ignored
    pub fn is_same(&self, other: &Component) -> bool {
        self.component_type == other.component_type
            && self.artifact_id == other.artifact_id
            && self.group_id == other.group_id
            && self.version == other.version
    }

    /// Own dependencies plus the dependencies of every direct child
    pub fn collect_all_dependencies(&self) -> BTreeSet<MvnArtifact> {
        self.dependencies
            .iter()
            .chain(self.components.iter().flat_map(|c| c.dependencies.iter()))
            .cloned()
            .collect()
    }

    /// Artifact describing this component itself
    pub fn artifact(&self) -> MvnArtifact {
        MvnArtifact::new(&self.group_id, &self.artifact_id, &self.version)
            .with_classifiers(self.classifiers.iter().cloned())
    }

    /// Whether a child module equivalent to `module` is already present
    pub fn has_module(&self, module: &Component) -> bool {
        self.components.iter().any(|c| c.is_same(module))
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{}:{}", name, self.version)
        } else if let Some(id) = &self.id {
            write!(f, "{}:{}", id, self.version)
        } else {
            write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
        }
    }
}

/// First child module whose artifactId ends with `suffix`
pub fn find_module_by_suffix<'a>(component: &'a Component, suffix: &str) -> Option<&'a Component> {
    component
        .components
        .iter()
        .find(|c| c.artifact_id.ends_with(suffix))
}

pub fn global_module(component: &Component) -> Option<&Component> {
    find_module_by_suffix(component, GLOBAL_MODULE_SUFFIX)
}

pub fn starter_module(component: &Component) -> Option<&Component> {
    find_module_by_suffix(component, STARTER_MODULE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(name: &str) -> MvnArtifact {
        MvnArtifact::new("com.example", name, "1.0.0").with_classifiers([Classifier::jar()])
    }

    fn addon() -> Component {
        Component::new("com.haulmont.reports", "reports", "7.2.3").with_type("cuba-addon")
    }

    #[test]
    fn new_uses_default_classifiers() {
        assert_eq!(addon().classifiers, Classifier::default_set());
    }

    #[test]
    fn is_same_ignores_nested_structure() {
        let bare = addon();
        let nested = addon()
            .with_components([Component::new("com.haulmont.reports", "reports-global", "7.2.3")])
            .with_dependencies([artifact("a")]);

        assert!(bare.is_same(&nested));
        assert!(nested.is_same(&bare));
        assert_ne!(bare, nested);
    }

    #[test]
    fn is_same_compares_type() {
        let lib = addon().with_type("lib");

        assert!(!addon().is_same(&lib));
    }

    #[test]
    fn collect_all_dependencies_merges_own_and_child_dependencies() {
        let child = Component::new("com.example", "child", "1.0.0").with_dependencies([artifact("b")]);
        let component = addon()
            .with_dependencies([artifact("a")])
            .with_components([child]);

        let dependencies = component.collect_all_dependencies();

        assert_eq!(dependencies, BTreeSet::from([artifact("a"), artifact("b")]));
    }

    #[test]
    fn collect_all_dependencies_removes_duplicates() {
        let child = Component::new("com.example", "child", "1.0.0").with_dependencies([artifact("a")]);
        let component = addon()
            .with_dependencies([artifact("a")])
            .with_components([child]);

        assert_eq!(component.collect_all_dependencies().len(), 1);
    }

    #[test]
    fn clone_is_deep() {
        let original = addon().with_dependencies([artifact("a")]);
        let mut copy = original.clone();
        copy.dependencies.insert(artifact("b"));

        assert_eq!(original.dependencies.len(), 1);
        assert_eq!(copy.dependencies.len(), 2);
    }

    #[test]
    fn display_prefers_name_then_id() {
        assert_eq!(addon().to_string(), "com.haulmont.reports:reports:7.2.3");
        assert_eq!(addon().with_id("reports").to_string(), "reports:7.2.3");
        assert_eq!(
            addon().with_id("reports").with_name("Reports").to_string(),
            "Reports:7.2.3"
        );
    }

    #[test]
    fn module_lookup_by_suffix() {
        let component = addon().with_components([
            Component::new("com.haulmont.reports", "reports-core", "7.2.3"),
            Component::new("com.haulmont.reports", "reports-global", "7.2.3"),
        ]);

        assert_eq!(
            global_module(&component).map(|c| c.artifact_id.as_str()),
            Some("reports-global")
        );
        assert_eq!(starter_module(&component), None);
        assert_eq!(
            find_module_by_suffix(&component, "-core").map(|c| c.artifact_id.as_str()),
            Some("reports-core")
        );
    }

    #[test]
    fn serializes_type_field() {
        let json = serde_json::to_value(addon()).unwrap();

        assert_eq!(json["type"], "cuba-addon");
        assert_eq!(json["artifactId"], "reports");
        assert!(json.get("name").is_none());
    }
}
