//! Marketplace addon catalog
//!
//! The catalog is downloaded from `<framework>.addon.marketplaceUrl`. When the
//! download fails, or `skipVersionLoading` is set, it is read from the file
//! named by `<framework>-addons-file` or, lacking that, the bundled snapshot.
//! Until [`AddonCatalog::load`] has run, reads are served from that offline
//! source without touching the network.

use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::http::{HttpFetcher, HttpRequest};
use crate::model::marketplace::{AddonCompatibility, CatalogDocument, MarketplaceAddon};
use crate::provider::error::CatalogError;
use crate::provider::framework::Framework;
use crate::resources::ResourceLoader;
use crate::settings::{SKIP_VERSION_LOADING, Settings};

/// When an addon's compatibility list is replaced by one entry per platform version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionRule {
    /// The first compatibility entry mentions this placeholder
    Sentinel(&'static str),
    Always,
}

impl ExpansionRule {
    pub fn applies_to(&self, addon: &MarketplaceAddon) -> bool {
        match self {
            ExpansionRule::Always => true,
            ExpansionRule::Sentinel(sentinel) => addon
                .compatibility_list
                .first()
                .is_some_and(|c| c.artifact_versions.join(", ").contains(sentinel)),
        }
    }
}

/// Rewrites the compatibility list to map each platform version to itself
pub fn expand_compatibility(addon: &mut MarketplaceAddon, platform_versions: &[String]) {
    addon.compatibility_list = platform_versions
        .iter()
        .map(|version| AddonCompatibility::new(version, &[version.as_str()]))
        .collect();
}

type Addons = Arc<Vec<MarketplaceAddon>>;

pub struct AddonCatalog {
    framework: Framework,
    settings: Arc<dyn Settings>,
    resources: Arc<dyn ResourceLoader>,
    fetcher: Arc<dyn HttpFetcher>,
    addons: RwLock<Option<Addons>>,
}

impl AddonCatalog {
    pub fn new(
        framework: Framework,
        settings: Arc<dyn Settings>,
        resources: Arc<dyn ResourceLoader>,
        fetcher: Arc<dyn HttpFetcher>,
    ) -> Self {
        Self {
            framework,
            settings,
            resources,
            fetcher,
            addons: RwLock::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.addons.read().map(|addons| addons.is_some()).unwrap_or(false)
    }

    /// Fetches the catalog, expands it against `platform_versions` and keeps it.
    /// A failed download falls back to the offline source.
    pub async fn load(&self, platform_versions: &[String]) -> Result<Addons, CatalogError> {
        let addons = match self.fetch_remote().await {
            Some(content) => match self.parse(&content, platform_versions) {
                Ok(addons) => addons,
                Err(e) => {
                    warn!("Invalid {} marketplace response, using offline catalog: {}", self.framework.id(), e);
                    self.parse(&self.offline_document()?, platform_versions)?
                }
            },
            None => self.parse(&self.offline_document()?, platform_versions)?,
        };

        let addons = Arc::new(addons);
        let mut slot = self.addons.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::clone(&addons));
        info!("Loaded {} {} addons", addons.len(), self.framework.display_name());
        Ok(addons)
    }

    /// The loaded catalog, or the offline catalog when loading hasn't finished
    pub fn addons(&self, platform_versions: &[String]) -> Result<Addons, CatalogError> {
        if let Some(addons) = self.addons.read().unwrap_or_else(|e| e.into_inner()).as_ref() {
            return Ok(Arc::clone(addons));
        }
        debug!("{} catalog not loaded yet, reading offline copy", self.framework.id());
        let addons = self.parse(&self.offline_document()?, platform_versions)?;
        Ok(Arc::new(addons))
    }

    async fn fetch_remote(&self) -> Option<String> {
        if self.settings.flag(SKIP_VERSION_LOADING) {
            debug!("Version loading disabled, skipping marketplace download");
            return None;
        }

        let key = format!("{}.addon.marketplaceUrl", self.framework.id());
        let Some(url) = self.settings.get(&key) else {
            warn!("{} is not set, using offline catalog", key);
            return None;
        };

        let request = HttpRequest::get(&url).header("Accept", "application/json");
        self.fetcher
            .get(request)
            .await
            .inspect_err(|e| warn!("Failed to download marketplace catalog from {}: {}", url, e))
            .ok()
    }

    fn offline_document(&self) -> Result<String, CatalogError> {
        let key = format!("{}-addons-file", self.framework.id());
        if let Some(path) = self.settings.get(&key) {
            return std::fs::read_to_string(&path).map_err(|source| CatalogError::Io { path, source });
        }

        let name = self.framework.catalog_resource();
        self.resources
            .read_resource(name)
            .ok_or_else(|| CatalogError::MissingResource(name.to_string()))
    }

    fn parse(&self, content: &str, platform_versions: &[String]) -> Result<Vec<MarketplaceAddon>, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(content)?;
        let rule = self.framework.expansion_rule();

        Ok(document
            .app_components
            .into_iter()
            .filter(|addon| match self.framework {
                Framework::Cuba => !addon.artifact_id.is_empty(),
                Framework::Jmix => !addon.dependencies.is_empty(),
            })
            .map(|mut addon| {
                if rule.applies_to(&addon) {
                    expand_compatibility(&mut addon, platform_versions);
                }
                addon
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{FetchError, MockHttpFetcher};
    use crate::resources::BundledResources;
    use crate::settings::SdkSettings;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MARKETPLACE: &str = r#"{"appComponents": [
        {"id": "reports", "groupId": "com.haulmont.reports", "artifactId": "reports-global",
         "compatibilityList": [{"id": "7.2", "artifactVersions": ["$cubaVersion"]}]},
        {"id": "bproc", "groupId": "com.haulmont.addon.bproc", "artifactId": "bproc-global",
         "compatibilityList": [{"id": "7.2", "artifactVersions": ["1.2.1"]}]},
        {"id": "broken", "groupId": "com.example"}
    ]}"#;

    fn platform_versions() -> Vec<String> {
        vec!["7.2.10".to_string(), "7.1.8".to_string()]
    }

    fn catalog(framework: Framework, settings: SdkSettings, fetcher: MockHttpFetcher) -> AddonCatalog {
        AddonCatalog::new(framework, Arc::new(settings), Arc::new(BundledResources), Arc::new(fetcher))
    }

    fn cuba_settings() -> SdkSettings {
        SdkSettings::default().with_property("cuba.addon.marketplaceUrl", "https://marketplace.invalid/cuba")
    }

    #[test]
    fn sentinel_rule_checks_first_entry_only() {
        let mut addon = MarketplaceAddon {
            compatibility_list: vec![
                AddonCompatibility::new("7.2", &["1.0"]),
                AddonCompatibility::new("7.1", &["$cubaVersion"]),
            ],
            ..Default::default()
        };
        let rule = ExpansionRule::Sentinel("$cubaVersion");

        assert!(!rule.applies_to(&addon));
        addon.compatibility_list.reverse();
        assert!(rule.applies_to(&addon));
        assert!(ExpansionRule::Always.applies_to(&MarketplaceAddon::default()));
    }

    #[test]
    fn expansion_maps_each_platform_version_to_itself() {
        let mut addon = MarketplaceAddon::default();

        expand_compatibility(&mut addon, &platform_versions());

        assert_eq!(
            addon.compatibility_list,
            vec![
                AddonCompatibility::new("7.2.10", &["7.2.10"]),
                AddonCompatibility::new("7.1.8", &["7.1.8"]),
            ]
        );
    }

    #[tokio::test]
    async fn load_expands_sentinel_entries_and_drops_incomplete_ones() {
        let mut fetcher = MockHttpFetcher::new();
        fetcher
            .expect_get()
            .withf(|request| request.url == "https://marketplace.invalid/cuba")
            .times(1)
            .returning(|_| Ok(MARKETPLACE.to_string()));
        let catalog = catalog(Framework::Cuba, cuba_settings(), fetcher);

        let addons = catalog.load(&platform_versions()).await.unwrap();

        assert!(catalog.is_loaded());
        assert_eq!(addons.len(), 2);
        assert_eq!(addons[0].compatibility_list.len(), 2);
        assert_eq!(addons[1].compatibility_list, vec![AddonCompatibility::new("7.2", &["1.2.1"])]);
    }

    #[tokio::test]
    async fn failed_download_falls_back_to_addons_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(MARKETPLACE.as_bytes()).unwrap();
        let mut fetcher = MockHttpFetcher::new();
        fetcher.expect_get().returning(|request| {
            Err(FetchError::UnexpectedStatus {
                status: 502,
                url: request.url,
            })
        });
        let settings = cuba_settings().with_property("cuba-addons-file", &file.path().display().to_string());
        let catalog = catalog(Framework::Cuba, settings, fetcher);

        let addons = catalog.load(&platform_versions()).await.unwrap();

        assert_eq!(addons.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(), vec!["reports", "bproc"]);
    }

    #[tokio::test]
    async fn skip_flag_reads_bundled_snapshot_without_network() {
        let mut fetcher = MockHttpFetcher::new();
        fetcher.expect_get().never();
        let settings = cuba_settings().with_property(SKIP_VERSION_LOADING, "true");
        let catalog = catalog(Framework::Cuba, settings, fetcher);

        let addons = catalog.load(&platform_versions()).await.unwrap();

        assert!(addons.iter().any(|a| a.id == "reports"));
    }

    #[test]
    fn unloaded_catalog_serves_offline_copy_without_storing_it() {
        let mut fetcher = MockHttpFetcher::new();
        fetcher.expect_get().never();
        let catalog = catalog(Framework::Jmix, SdkSettings::default(), fetcher);

        let addons = catalog.addons(&platform_versions()).unwrap();

        assert!(!addons.is_empty());
        assert!(addons.iter().all(|a| a.compatibility_list.len() == 2));
        assert!(!catalog.is_loaded());
    }

    #[test]
    fn missing_addons_file_is_an_error() {
        let settings = SdkSettings::default().with_property("jmix-addons-file", "/nonexistent/jmix.json");
        let catalog = catalog(Framework::Jmix, settings, MockHttpFetcher::new());

        assert!(matches!(
            catalog.addons(&platform_versions()),
            Err(CatalogError::Io { .. })
        ));
    }
}
