use std::time::Duration;

use log::debug;

use crate::{
    config::DepmodelConfig,
    metadata::{CachingMetadataGateway, MavenMetadataGateway},
    model::MavenRepository,
    DependencyModel,
};

#[derive(Default)]
pub struct DependencyModelBuilder {
    default_repositories: Option<Vec<MavenRepository>>,
    metadata_timeout: Option<Duration>,
}

impl DependencyModelBuilder {
    /// Repositories consulted for projects that declare none.
    ///
    /// Defaults to `GRADLE_DEPMODEL_REPOSITORY_URL`, or Maven Central.
    pub fn default_repositories(mut self, repositories: Vec<MavenRepository>) -> Self {
        self.default_repositories = Some(repositories);
        self
    }

    /// Per-request timeout for metadata downloads.
    ///
    /// Defaults to `GRADLE_DEPMODEL_METADATA_TIMEOUT` seconds, or 30 seconds.
    pub fn metadata_timeout(mut self, timeout: Duration) -> Self {
        self.metadata_timeout = Some(timeout);
        self
    }

    pub fn try_build(self) -> anyhow::Result<DependencyModel> {
        let Self {
            default_repositories,
            metadata_timeout,
        } = self;
        let config = DepmodelConfig::load()?;

        let default_repositories =
            default_repositories.unwrap_or_else(|| config.default_repositories());
        let metadata_timeout = metadata_timeout.unwrap_or_else(|| config.metadata_timeout());
        debug!(
            "Using default repositories {:?} with a {:?} metadata timeout",
            default_repositories, metadata_timeout
        );

        let gateway = CachingMetadataGateway::new(MavenMetadataGateway::new(metadata_timeout)?);
        Ok(DependencyModel::with_gateway(gateway, default_repositories))
    }
}
