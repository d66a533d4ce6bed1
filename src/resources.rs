//! Resources shipped inside the binary

pub const SDK_DEFAULTS: &str = "sdk-defaults.json";
pub const CUBA_APP_COMPONENTS: &str = "cuba-app-components.json";
pub const JMIX_APP_COMPONENTS: &str = "jmix-app-components.json";

/// Loads named resources (settings defaults, marketplace snapshots)
pub trait ResourceLoader: Send + Sync {
    fn read_resource(&self, name: &str) -> Option<String>;
}

/// Resources compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledResources;

impl ResourceLoader for BundledResources {
    fn read_resource(&self, name: &str) -> Option<String> {
        let content = match name {
            SDK_DEFAULTS => include_str!("../resources/sdk-defaults.json"),
            CUBA_APP_COMPONENTS => include_str!("../resources/cuba-app-components.json"),
            JMIX_APP_COMPONENTS => include_str!("../resources/jmix-app-components.json"),
            _ => return None,
        };
        Some(content.to_string())
    }
}
