//! Key-value settings consumed by providers
//!
//! Settings are a flat string map. Bundled defaults are overlaid by an optional
//! user file (`sdk.json` in the SDK home directory).

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::resources::{BundledResources, ResourceLoader, SDK_DEFAULTS};

/// Forces catalog reads from the local/bundled snapshot instead of the network
pub const SKIP_VERSION_LOADING: &str = "skipVersionLoading";

/// Download URL pattern for Gradle distributions (`%s` is the version)
pub const GRADLE_DOWNLOAD_LINK: &str = "gradle.downloadLink";

/// Comma separated addon ids hidden from the Jmix addon catalog
pub const JMIX_IGNORED_ADDONS: &str = "jmix.addon.ignoredComponents";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid settings document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Bundled resource {0} is missing")]
    MissingResource(String),
}

/// Read access to SDK settings
pub trait Settings: Send + Sync {
    /// Returns the value of `key` if it is set
    fn get(&self, key: &str) -> Option<String>;

    fn has_property(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Interprets `key` as a boolean flag; absent or unparsable values are false
    fn flag(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SdkSettings {
    properties: HashMap<String, String>,
}

impl SdkSettings {
    /// Loads bundled defaults and overlays `path` if it exists
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let mut settings = Self::defaults(&BundledResources)?;

        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let overrides: HashMap<String, String> = serde_json::from_str(&content)?;
            debug!("Loaded {} settings overrides from {:?}", overrides.len(), path);
            settings.properties.extend(overrides);
        } else {
            info!("No settings file at {:?}, using defaults", path);
        }

        Ok(settings)
    }

    /// Bundled default settings
    pub fn defaults(resources: &dyn ResourceLoader) -> Result<Self, SettingsError> {
        let content = resources
            .read_resource(SDK_DEFAULTS)
            .ok_or_else(|| SettingsError::MissingResource(SDK_DEFAULTS.to_string()))?;
        let properties = serde_json::from_str(&content)?;
        Ok(Self { properties })
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    /// All properties ordered by key
    pub fn properties(&self) -> BTreeMap<&str, &str> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

impl Settings for SdkSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.properties.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn defaults_contain_marketplace_urls() {
        let settings = SdkSettings::defaults(&BundledResources).unwrap();

        assert!(settings.has_property("cuba.addon.marketplaceUrl"));
        assert!(settings.has_property("jmix.addon.marketplaceUrl"));
        assert!(!settings.flag(SKIP_VERSION_LOADING));
    }

    #[test]
    fn load_overlays_user_file_on_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sdk.json");
        std::fs::write(
            &path,
            r#"{ "skipVersionLoading": "true", "cuba-addons-file": "/tmp/addons.json" }"#,
        )
        .unwrap();

        let settings = SdkSettings::load(&path).unwrap();

        assert!(settings.flag(SKIP_VERSION_LOADING));
        assert_eq!(
            settings.get("cuba-addons-file"),
            Some("/tmp/addons.json".to_string())
        );
        assert!(settings.has_property("jmix.addon.marketplaceUrl"));
    }

    #[test]
    fn load_without_user_file_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();

        let settings = SdkSettings::load(&temp_dir.path().join("missing.json")).unwrap();

        assert_eq!(settings, SdkSettings::defaults(&BundledResources).unwrap());
    }

    #[test]
    fn load_rejects_malformed_user_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sdk.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            SdkSettings::load(&path),
            Err(SettingsError::Parse(_))
        ));
    }

    #[rstest]
    #[case("true", true)]
    #[case(" TRUE ", true)]
    #[case("false", false)]
    #[case("yes", false)]
    fn flag_parses_boolean_values(#[case] value: &str, #[case] expected: bool) {
        let settings = SdkSettings::default().with_property("some.flag", value);

        assert_eq!(settings.flag("some.flag"), expected);
    }

    #[test]
    fn flag_is_false_when_absent() {
        assert!(!SdkSettings::default().flag("missing.flag"));
    }
}
