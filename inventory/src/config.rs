use catalog::database::{StoreBackend, StoreError};
use importer::source::{DEFAULT_METAL_COMMAND, default_ssh_command};
use importer::{
    CollisionPolicy, FixtureSource, ImportOptions, QueryError, QuerySource, RetryingSource,
    SshMetalClient,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const STORE_URL_VAR: &str = "INVENTORY_STORE_URL";
pub const SOURCE_HOST_VAR: &str = "INVENTORY_SOURCE_HOST";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Store backend '{0:?}' needs a url")]
    MissingStoreUrl(BackendKind),

    #[error("Source host is not configured (set source.host or INVENTORY_SOURCE_HOST)")]
    MissingHost,

    #[error("Fixture source needs a path")]
    MissingFixturePath,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Source(#[from] QueryError),
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub store: StoreConfig,
    pub source: SourceConfig,
    pub import: ImportConfig,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
    Sqlite,
    Postgres,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub backend: BackendKind,
    /// Takes precedence over `backend` when set.
    pub url: Option<String>,
}

impl StoreConfig {
    pub fn backend(&self) -> Result<StoreBackend, ConfigError> {
        match (&self.url, self.backend) {
            (Some(url), _) => Ok(StoreBackend::from_url(url)?),
            (None, BackendKind::Memory) => Ok(StoreBackend::Memory),
            (None, kind) => Err(ConfigError::MissingStoreUrl(kind)),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Ssh,
    Fixture,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub host: Option<String>,
    pub user: String,
    pub ssh_command: Vec<String>,
    pub metal_command: String,
    pub path: Option<PathBuf>,
    /// Retries of a failed query; 0 disables retrying.
    pub retries: usize,
    pub retry_base_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Ssh,
            host: None,
            user: "root".to_owned(),
            ssh_command: default_ssh_command(),
            metal_command: DEFAULT_METAL_COMMAND.to_owned(),
            path: None,
            retries: 0,
            retry_base_ms: 100,
        }
    }
}

impl SourceConfig {
    pub fn build(&self) -> Result<Box<dyn QuerySource>, ConfigError> {
        let source: Box<dyn QuerySource> = match self.kind {
            SourceKind::Fixture => {
                let path = self.path.as_deref().ok_or(ConfigError::MissingFixturePath)?;
                Box::new(FixtureSource::from_file(path)?)
            }
            SourceKind::Ssh => {
                let host = self.host.as_deref().ok_or(ConfigError::MissingHost)?;
                info!(host, user = %self.user, "Querying metal over ssh");
                Box::new(
                    SshMetalClient::new(host)
                        .with_user(&self.user)
                        .with_ssh_command(self.ssh_command.clone())
                        .with_metal_command(&self.metal_command),
                )
            }
        };

        if self.retries == 0 {
            return Ok(source);
        }
        Ok(Box::new(RetryingSource::new(
            source,
            self.retry_base_ms,
            self.retries,
        )))
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    pub collision_policy: CollisionPolicy,
    pub strict_topology: bool,
    pub skip_nodes: Vec<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        let options = ImportOptions::default();
        Self {
            collision_policy: options.collision_policy,
            strict_topology: options.strict_topology,
            skip_nodes: options.skip_nodes,
        }
    }
}

impl From<ImportConfig> for ImportOptions {
    fn from(config: ImportConfig) -> Self {
        ImportOptions {
            collision_policy: config.collision_policy,
            strict_topology: config.strict_topology,
            skip_nodes: config.skip_nodes,
        }
    }
}

impl Config {
    /// Reads `path`, or falls back to the defaults when there is none.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Applies overrides found through `lookup`, e.g. `std::env::var`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(STORE_URL_VAR) {
            self.store.url = Some(url);
        }
        if let Some(host) = lookup(SOURCE_HOST_VAR) {
            self.source.host = Some(host);
        }
    }
}
