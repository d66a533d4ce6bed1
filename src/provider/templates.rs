//! Module sets that make up platform and addon components

use crate::model::classifier::Classifier;
use crate::model::component::Component;

const CUBA_GROUP: &str = "com.haulmont.cuba";
const JMIX_GROUP: &str = "io.jmix";

/// Module with the default classifiers plus `extra`
fn module(group_id: &str, artifact_id: &str, version: &str, extra: &[Classifier]) -> Component {
    let mut component = Component::new(group_id, artifact_id, version);
    component.classifiers.extend(extra.iter().cloned());
    component
}

fn web_classifiers() -> [Classifier; 3] {
    [
        Classifier::javadoc(),
        Classifier::new("themes"),
        Classifier::with_extension("web", "zip"),
    ]
}

fn toolkit_classifiers() -> [Classifier; 2] {
    [Classifier::client(), Classifier::new("debug-client")]
}

pub fn cuba_platform_modules(version: &str) -> Vec<Component> {
    vec![
        module(CUBA_GROUP, "cuba-core", version, &[Classifier::with_extension("db", "zip")]),
        module(CUBA_GROUP, "cuba-idp", version, &[Classifier::new("web")]),
        module(CUBA_GROUP, "cuba-web", version, &web_classifiers()),
        module(CUBA_GROUP, "cuba-web-toolkit", version, &toolkit_classifiers()),
        module(CUBA_GROUP, "cuba-web-widgets", version, &toolkit_classifiers()),
        module(CUBA_GROUP, "cuba-web6", version, &[Classifier::new("web")]),
        Component::new(CUBA_GROUP, "cuba-web6-themes", version)
            .with_classifiers([Classifier::jar(), Classifier::pom()]),
        module(CUBA_GROUP, "cuba-web6-toolkit", version, &[]),
    ]
}

/// Libraries every CUBA project build needs besides the platform modules
pub fn cuba_platform_libs(version: &str) -> Vec<Component> {
    vec![
        Component::new("com.haulmont.cuba-resources", "cuba-png-icons", "1.0.1")
            .with_classifiers([Classifier::jar(), Classifier::pom()]),
        Component::new("com.haulmont.gradle", "cuba-plugin", version).with_classifiers([
            Classifier::jar(),
            Classifier::pom(),
            Classifier::sdk(),
            Classifier::sources(),
        ]),
        Component::new(
            "gradle.plugin.org.jetbrains.gradle.plugin.idea-ext",
            "gradle-idea-ext",
            "0.5",
        ),
        Component::new("javax.xml.bind", "jaxb-api", "2.3.1"),
        Component::new("org.glassfish.jaxb", "jaxb-runtime", "2.3.1"),
        Component::new("org.hsqldb", "hsqldb", "2.4.1"),
    ]
}

pub fn jmix_platform_modules(version: &str) -> Vec<Component> {
    [
        ("data", "jmix-eclipselink-starter"),
        ("ui", "jmix-jmix-ui-starter"),
        ("ui", "jmix-ui-data-starter"),
        ("ui", "jmix-ui-themes-compiled"),
        ("ui", "jmix-ui-widgets-compiled"),
        ("security", "jmix-security-starter"),
        ("security", "jmix-security-ui-starter"),
        ("security", "jmix-security-data-starter"),
        ("localfs", "jmix-localfs-starter"),
    ]
    .into_iter()
    .map(|(package, artifact_id)| {
        Component::new(&format!("{}.{}", JMIX_GROUP, package), artifact_id, version)
    })
    .collect()
}

pub fn jmix_platform_libs(version: &str) -> Vec<Component> {
    vec![
        Component::new("io.jmix.build", "io.jmix.build.gradle.plugin", version)
            .with_classifiers([Classifier::pom()]),
        Component::new("org.hsqldb", "hsqldb", "2.4.1"),
        Component::new("org.springframework.boot", "spring-boot-starter-web", "2.5.2"),
    ]
}

/// Standard module layout of a CUBA addon named `name`, plus addon-specific extras
pub fn cuba_addon_modules(addon_id: Option<&str>, group_id: &str, name: &str, version: &str) -> Vec<Component> {
    let artifact = |suffix: &str| format!("{}-{}", name, suffix);
    let mut modules = vec![
        module(group_id, &artifact("global"), version, &[]),
        module(group_id, &artifact("gui"), version, &[]),
        module(group_id, &artifact("portal"), version, &[]),
        module(group_id, &artifact("core"), version, &[Classifier::with_extension("db", "zip")]),
        module(group_id, &artifact("web"), version, &web_classifiers()),
        module(group_id, &artifact("web-themes"), version, &[]),
        module(group_id, &artifact("web-toolkit"), version, &[Classifier::client()]),
    ];

    match addon_id {
        Some("bproc") => modules.push(module(group_id, &artifact("modeler"), version, &[])),
        Some("maps") => {
            // maps ships its widgetset as a web archive next to the client jar
            if let Some(toolkit) = modules.iter_mut().find(|m| m.artifact_id == artifact("web-toolkit")) {
                toolkit.classifiers.insert(Classifier::with_extension("web", "zip"));
            }
        }
        _ => {}
    }

    modules
}

/// Core Jmix starters every addon is consumed with
pub fn jmix_addon_modules(version: &str) -> Vec<Component> {
    vec![
        Component::new("io.jmix.core", "jmix-core-starter", version),
        Component::new("io.jmix.data", "jmix-eclipselink-starter", version),
        Component::new("io.jmix.ui", "jmix-ui-starter", version),
        Component::new("io.jmix.ui", "jmix-ui-themes", version),
    ]
}
