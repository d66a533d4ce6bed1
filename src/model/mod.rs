//! Data model shared by providers, repositories and commands

pub mod artifact;
pub mod classifier;
pub mod component;
pub mod marketplace;
pub mod repository;
pub mod version;

pub use artifact::MvnArtifact;
pub use classifier::Classifier;
pub use component::{Component, find_module_by_suffix, global_module, starter_module};
pub use marketplace::{AddonCompatibility, AddonDependency, CatalogDocument, MarketplaceAddon};
pub use repository::{Authentication, Repository, RepositoryTarget, RepositoryType};
pub use version::Version;
