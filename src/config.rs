use std::{collections::HashMap, time::Duration};

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use crate::model::{MavenRepository, MAVEN_CENTRAL_URL};

const DEFAULT_METADATA_TIMEOUT_SECS: u64 = 30;

pub struct DepmodelConfig {
    pub default_repository_url: Option<String>,
    pub metadata_timeout_secs: Option<u64>,
}

impl DepmodelConfig {
    pub fn load() -> anyhow::Result<Self> {
        let raw_config = RawConfig::load(None)?;

        Ok(Self {
            default_repository_url: raw_config.repository.url,
            metadata_timeout_secs: raw_config.metadata.timeout,
        })
    }

    /// Repositories consulted for projects that declare none.
    pub fn default_repositories(&self) -> Vec<MavenRepository> {
        vec![MavenRepository::new(
            "default",
            self.default_repository_url
                .as_deref()
                .unwrap_or(MAVEN_CENTRAL_URL),
        )]
    }

    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(
            self.metadata_timeout_secs
                .unwrap_or(DEFAULT_METADATA_TIMEOUT_SECS),
        )
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    #[serde(default)]
    repository: RepositoryConfig,
    #[serde(default)]
    metadata: MetadataConfig,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RepositoryConfig {
    url: Option<String>,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct MetadataConfig {
    timeout: Option<u64>,
}

impl RawConfig {
    fn load(env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                Environment::with_prefix("GRADLE_DEPMODEL")
                    .separator("_")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}
