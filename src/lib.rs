pub mod app;
pub mod config;
pub mod http;
pub mod logging;
pub mod model;
pub mod provider;
pub mod repository;
pub mod resources;
pub mod settings;
pub mod version;
