//! Version discovery layer
//!
//! Providers answer `versions(component_id)` through a [`lookup::VersionLookup`]
//! they own. A lookup consults its cache first and falls back to searching the
//! SEARCH repositories.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Provider  │────▶│   Lookup    │────▶│    Cache    │
//! │ (versions)  │     │ (endpoints) │     │ (10 min TTL)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │ miss
//!                            ▼
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │   Search    │────▶│   Ranking   │
//!                     │(Nexus2/3)   │     │(per major)  │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: time-bounded per-provider cache with a pluggable clock
//! - [`lookup`]: endpoint selection and cached lookups
//! - [`search`]: Nexus2/Nexus3 version search requests
//! - [`ranking`]: "latest per major line" reduction
//! - [`error`]: error type for search operations
//! - [`types`]: `VersionOption`

pub mod cache;
pub mod error;
pub mod lookup;
pub mod ranking;
pub mod search;
pub mod types;

pub use cache::{Clock, ManualClock, SystemClock, VersionCache};
pub use lookup::VersionLookup;
pub use search::{SearchEndpoint, SearchProtocol, VersionSearch};
pub use types::VersionOption;
