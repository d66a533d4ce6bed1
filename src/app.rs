//! Command handlers behind the `cuba-sdk` binary

use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use crate::config::{
    FETCH_TIMEOUT_MS, LOAD_WAIT_MS, maven_local_repository, repository_db_path, settings_path,
};
use crate::http::ReqwestFetcher;
use crate::model::artifact::MvnArtifact;
use crate::model::component::Component;
use crate::model::repository::{Repository, RepositoryTarget, RepositoryType};
use crate::provider::{ComponentProvider, ComponentRegistry, SdkContext};
use crate::repository::license::activate_license;
use crate::repository::sqlite::SqliteRepositoryStore;
use crate::repository::store::RepositoryStore;
use crate::resources::BundledResources;
use crate::settings::SdkSettings;
use crate::version::cache::SystemClock;

#[derive(Parser)]
#[command(name = "cuba-sdk")]
#[command(version, about = "Resolve CUBA and Jmix components against Maven repositories")]
pub struct Cli {
    /// Write log records as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List registered component providers
    Providers,
    /// List the catalog of a provider
    Components { provider_type: String },
    /// List known versions of a component
    Versions {
        provider_type: String,
        component_id: Option<String>,
    },
    /// Resolve coordinates into a component with its modules and dependencies
    Resolve {
        provider_type: String,
        coordinates: String,
    },
    /// Manage configured repositories
    Repository {
        #[command(subcommand)]
        action: RepositoryAction,
    },
    /// Configure premium repositories from a license key
    License { key: String },
    /// Print effective settings
    Properties,
}

#[derive(Subcommand)]
pub enum RepositoryAction {
    List {
        #[arg(long)]
        target: Option<RepositoryTarget>,
    },
    Add {
        name: String,
        url: String,
        #[arg(long, default_value = "source")]
        target: RepositoryTarget,
        #[arg(long = "type", default_value = "nexus2")]
        repository_type: RepositoryType,
        #[arg(long)]
        login: Option<String>,
        #[arg(long)]
        password: Option<String>,
        /// Nexus3 repository name used in search requests
        #[arg(long)]
        repository_name: Option<String>,
    },
    Remove {
        name: String,
        #[arg(long, default_value = "source")]
        target: RepositoryTarget,
    },
}

/// Everything a command needs, built once per invocation
pub struct App {
    settings: Arc<SdkSettings>,
    store: Arc<dyn RepositoryStore>,
    registry: ComponentRegistry,
}

#[derive(Serialize)]
struct Resolved<'a> {
    component: &'a Component,
    additional: &'a BTreeSet<Component>,
    dependencies: BTreeSet<MvnArtifact>,
}

impl App {
    pub fn open() -> anyhow::Result<Self> {
        let settings = Arc::new(SdkSettings::load(&settings_path())?);
        let store: Arc<dyn RepositoryStore> = Arc::new(
            SqliteRepositoryStore::open(&repository_db_path(), &maven_local_repository())
                .context("Failed to open repository store")?,
        );
        let fetcher = Arc::new(ReqwestFetcher::new(Duration::from_millis(FETCH_TIMEOUT_MS))?);

        let context = SdkContext {
            settings: settings.clone(),
            store: Arc::clone(&store),
            fetcher,
            resources: Arc::new(BundledResources),
            clock: Arc::new(SystemClock),
        };
        let registry = ComponentRegistry::assemble(&context);

        Ok(Self {
            settings,
            store,
            registry,
        })
    }

    fn provider(&self, provider_type: &str) -> anyhow::Result<Arc<dyn ComponentProvider>> {
        match self.registry.provider(provider_type) {
            Some(provider) => Ok(provider),
            None => bail!(
                "Unknown provider type '{}', expected one of: {}",
                provider_type,
                self.registry
                    .providers()
                    .map(|p| p.provider_type())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    /// Starts provider loads and waits a bounded time for catalog data
    async fn warm_up(&self) {
        let ready = self
            .registry
            .load_all()
            .wait_ready(Duration::from_millis(LOAD_WAIT_MS))
            .await;
        info!("Providers ready: {}", ready);
    }

    pub async fn run(&self, command: Command, out: &mut impl Write) -> anyhow::Result<()> {
        match command {
            Command::Providers => {
                for provider in self.registry.providers() {
                    writeln!(out, "{}\t{}", provider.provider_type(), provider.name())?;
                }
            }
            Command::Components { provider_type } => {
                let provider = self.provider(&provider_type)?;
                self.warm_up().await;
                match provider.components().await {
                    Some(components) => {
                        for component in components {
                            writeln!(out, "{}", component)?;
                        }
                    }
                    None => writeln!(out, "{} has no component catalog", provider.name())?,
                }
            }
            Command::Versions {
                provider_type,
                component_id,
            } => {
                let provider = self.provider(&provider_type)?;
                self.warm_up().await;
                for version in provider.versions(component_id.as_deref()).await {
                    writeln!(out, "{}", version.name)?;
                }
            }
            Command::Resolve {
                provider_type,
                coordinates,
            } => {
                let provider = self.provider(&provider_type)?;
                self.warm_up().await;
                let template = provider
                    .resolve_coordinates(&coordinates)
                    .with_context(|| format!("Invalid coordinates '{}'", coordinates))?;
                let mut component = provider
                    .create_from_template(&template)
                    .await
                    .with_context(|| format!("Component {} not found", template))?;
                let additional = provider.search_additional_components(&mut component).await?;

                let mut dependencies = component.collect_all_dependencies();
                dependencies.extend(additional.iter().flat_map(|c| c.collect_all_dependencies()));
                let resolved = Resolved {
                    component: &component,
                    additional: &additional,
                    dependencies,
                };
                writeln!(out, "{}", serde_json::to_string_pretty(&resolved)?)?;
            }
            Command::Repository { action } => self.repository(action, out)?,
            Command::License { key } => {
                for repository in activate_license(self.store.as_ref(), &key)? {
                    writeln!(out, "Configured {} ({})", repository.name, repository.url)?;
                }
            }
            Command::Properties => {
                for (key, value) in self.settings.properties() {
                    writeln!(out, "{} = {}", key, value)?;
                }
            }
        }
        Ok(())
    }

    fn repository(&self, action: RepositoryAction, out: &mut impl Write) -> anyhow::Result<()> {
        match action {
            RepositoryAction::List { target } => {
                let targets = match target {
                    Some(target) => vec![target],
                    None => RepositoryTarget::all().to_vec(),
                };
                for target in targets {
                    for repository in self.store.get_repositories(target)? {
                        writeln!(
                            out,
                            "{}\t{}\t{}\t{}",
                            target, repository.name, repository.repository_type, repository.url
                        )?;
                    }
                }
            }
            RepositoryAction::Add {
                name,
                url,
                target,
                repository_type,
                login,
                password,
                repository_name,
            } => {
                let mut repository = Repository::new(&name, repository_type, &url);
                if let Some(login) = login {
                    repository = repository.with_auth(&login, password.as_deref().unwrap_or(""));
                }
                if let Some(repository_name) = repository_name {
                    repository = repository.with_repository_name(&repository_name);
                }
                self.store.add_repository(repository, target)?;
                writeln!(out, "Repository {} added to {}", name, target)?;
            }
            RepositoryAction::Remove { name, target } => {
                if self.store.get_repository(&name, target)?.is_none() {
                    bail!("Repository {} not found in {}", name, target);
                }
                self.store.remove_repository(&name, target)?;
                writeln!(out, "Repository {} removed from {}", name, target)?;
            }
        }
        Ok(())
    }
}
