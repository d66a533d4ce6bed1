//! Marketplace catalog documents for CUBA and Jmix addons
//!
//! CUBA entries name their global module through `groupId`/`artifactId`;
//! Jmix entries list the starters they are consumed through in `dependencies`.
//! Both variants share one struct with the unused side left empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    #[serde(default)]
    pub app_components: Vec<MarketplaceAddon>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketplaceAddon {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub about: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub vendor: String,
    /// Milliseconds since the Unix epoch
    #[serde(deserialize_with = "null_as_default")]
    pub update_date_time: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub group_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub artifact_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub dependencies: Vec<AddonDependency>,
    #[serde(deserialize_with = "null_as_default")]
    pub compatibility_list: Vec<AddonCompatibility>,
    #[serde(deserialize_with = "null_as_default")]
    pub commercial: bool,
}

/// Treats an explicit `null` like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl MarketplaceAddon {
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.update_date_time)
    }

    /// Every addon version across all compatibility entries, paired with its platform version
    pub fn artifact_versions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.compatibility_list.iter().flat_map(|compatibility| {
            compatibility
                .artifact_versions
                .iter()
                .map(move |version| (version.as_str(), compatibility.platform_requirement.as_str()))
        })
    }

    /// Platform version the given addon version is compatible with
    pub fn platform_for(&self, addon_version: &str) -> Option<&str> {
        self.artifact_versions()
            .find(|(version, _)| *version == addon_version)
            .map(|(_, platform)| platform)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonDependency {
    pub group: String,
    pub name: String,
}

/// Addon versions released for one platform version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonCompatibility {
    #[serde(rename = "id", alias = "platformRequirement")]
    pub platform_requirement: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub artifact_versions: Vec<String>,
}

impl AddonCompatibility {
    pub fn new(platform_requirement: &str, artifact_versions: &[&str]) -> Self {
        Self {
            platform_requirement: platform_requirement.to_string(),
            artifact_versions: artifact_versions.iter().map(|v| v.to_string()).collect(),
        }
    }
}
