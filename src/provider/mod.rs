//! Component providers
//!
//! A provider turns user input (coordinates, catalog templates) into
//! [`Component`]s for one component family and answers version queries for it.
//! Providers are registered by their `provider_type()`, which command
//! dispatch uses as a routing key.
//!
//! # Modules
//!
//! - [`library`]: plain Maven coordinates
//! - [`framework`]: CUBA and Jmix platform editions
//! - [`addon`]: marketplace addons for both platforms
//! - [`catalog`]: marketplace catalog download and offline fallback
//! - [`templates`]: module sets of platform and addon components
//! - [`registry`]: explicit assembly and background loading
//! - [`resolver`]: completes templates from repository search and POMs
//! - [`error`]: error types for catalog and resolution failures

pub mod addon;
pub mod catalog;
pub mod error;
pub mod framework;
pub mod library;
pub mod registry;
pub mod resolver;
pub mod templates;

use std::collections::BTreeSet;

use crate::model::component::Component;
use crate::version::types::VersionOption;

pub use addon::AddonProvider;
pub use error::{CatalogError, ProviderError};
pub use framework::{Framework, FrameworkProvider};
pub use library::LibProvider;
pub use registry::{ComponentRegistry, LoadHandles, SdkContext};

/// Resolution strategy for one component family
#[async_trait::async_trait]
pub trait ComponentProvider: Send + Sync {
    /// Human readable provider name
    fn name(&self) -> &'static str;

    /// Unique routing key, also stamped on every component this provider produces
    fn provider_type(&self) -> &'static str;

    /// Fixed catalog of templates, or None when components are only created ad hoc
    async fn components(&self) -> Option<Vec<Component>> {
        None
    }

    /// Versions known for `component_id`; never fails, degrades to empty
    async fn versions(&self, _component_id: Option<&str>) -> Vec<VersionOption> {
        Vec::new()
    }

    /// Parses colon-delimited coordinates; None signals malformed input
    fn resolve_coordinates(&self, coordinates: &str) -> Option<Component>;

    /// Materialises a full component from a partially specified template
    async fn create_from_template(&self, template: &Component) -> Option<Component>;

    /// Companion components `component` requires. May update `component` itself
    /// (e.g. its framework version).
    async fn search_additional_components(
        &self,
        _component: &mut Component,
    ) -> Result<BTreeSet<Component>, ProviderError> {
        Ok(BTreeSet::new())
    }

    /// Idempotent metadata warm-up, run once in the background at startup
    async fn load(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
