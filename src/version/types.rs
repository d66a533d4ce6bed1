//! Common types for version discovery

use serde::Serialize;

/// One selectable version as presented to the command layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionOption {
    pub id: String,
    /// Human readable label (`1.2.0 [CUBA 7.2]`)
    pub name: String,
    pub value: String,
}

impl VersionOption {
    /// Option whose id, label and value are all the raw version
    pub fn plain(version: &str) -> Self {
        Self {
            id: version.to_string(),
            name: version.to_string(),
            value: version.to_string(),
        }
    }

    pub fn labelled(version: &str, name: String) -> Self {
        Self {
            id: version.to_string(),
            name,
            value: version.to_string(),
        }
    }
}
