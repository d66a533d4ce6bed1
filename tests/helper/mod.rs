//! Shared fixtures for integration tests

mod registry;

pub use registry::*;
