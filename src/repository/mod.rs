//! Repository layer: routing store, POM access and module search
//!
//! # Modules
//!
//! - [`store`]: `RepositoryStore` trait mapping SOURCE/TARGET/SEARCH to ordered repository sets
//! - [`sqlite`]: persistent store backed by SQLite
//! - [`memory`]: in-process store
//! - [`license`]: premium repository activation
//! - [`pom`]: POM reads from SOURCE repositories
//! - [`search`]: module discovery in SEARCH repositories
//! - [`error`]: error types for store and POM operations

pub mod error;
pub mod license;
pub mod memory;
pub mod pom;
pub mod search;
pub mod sqlite;
pub mod store;

pub use error::{PomError, StoreError};
pub use memory::MemoryRepositoryStore;
pub use sqlite::SqliteRepositoryStore;
pub use store::{RepositoryStore, repository_id};
