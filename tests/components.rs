//! Coordinate parsing and template materialisation through the registry

mod helper;

use std::collections::BTreeSet;

use mockito::Server;
use rstest::rstest;

use cuba_sdk::model::artifact::MvnArtifact;
use cuba_sdk::model::classifier::Classifier;
use cuba_sdk::model::component::Component;

use helper::TestRegistryBuilder;

#[rstest]
#[case("g:a:1.0", Some(Classifier::default_set()))]
#[case("g:a:1.0:zip", Some(BTreeSet::from([Classifier::pom(), Classifier::with_extension("", "zip")])))]
#[case("g:a:1.0:zip:dist", Some(BTreeSet::from([Classifier::pom(), Classifier::with_extension("dist", "zip")])))]
#[case("a:b", None)]
#[case("a:b:c:d:e:f", None)]
#[tokio::test]
async fn lib_coordinates_follow_segment_count(
    #[case] coordinates: &str,
    #[case] expected: Option<BTreeSet<Classifier>>,
) {
    let server = Server::new_async().await;
    let test = TestRegistryBuilder::new(&server).build();
    let lib = test.registry.provider("lib").unwrap();

    let component = lib.resolve_coordinates(coordinates);

    assert_eq!(component.map(|c| c.classifiers), expected);
}

#[tokio::test]
async fn lib_template_becomes_typed_component() {
    let server = Server::new_async().await;
    let test = TestRegistryBuilder::new(&server).build();
    let lib = test.registry.provider("lib").unwrap();

    let template = lib.resolve_coordinates("org.postgresql:postgresql:42.2.5:jar").unwrap();
    let component = lib.create_from_template(&template).await.unwrap();

    assert_eq!(component.id.as_deref(), Some("org.postgresql:postgresql"));
    assert_eq!(component.component_type, "lib");
    assert_eq!(component.version, "42.2.5");
    assert!(component.is_same(&template));
    assert!(
        lib.search_additional_components(&mut component.clone())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn framework_coordinates_accept_bare_or_prefixed_version() {
    let server = Server::new_async().await;
    let test = TestRegistryBuilder::new(&server).build();
    let cuba = test.registry.provider("cuba").unwrap();

    let bare = cuba.resolve_coordinates("7.2.10").unwrap();
    let prefixed = cuba.resolve_coordinates("cuba:7.2.10").unwrap();

    assert!(bare.is_same(&prefixed));
    assert_eq!(bare.version, "7.2.10");
    assert_eq!(bare.component_type, "cuba");
    assert!(cuba.resolve_coordinates("cuba:").is_none());
}

#[test]
fn dependencies_are_collected_across_children() {
    let a = MvnArtifact::new("com.foo", "a", "1.0");
    let b = MvnArtifact::new("com.foo", "b", "1.0");
    let child = Component::new("com.foo", "child", "1.0").with_dependencies([b.clone()]);
    let parent = Component::new("com.foo", "parent", "1.0")
        .with_dependencies([a.clone()])
        .with_components([child]);

    assert_eq!(parent.collect_all_dependencies(), BTreeSet::from([a, b]));
}
