mod cache;
mod maven;

use std::sync::Arc;

use log::warn;
use thiserror::Error;

use crate::model::{GroupArtifact, MavenRepository};

pub use cache::CachingMetadataGateway;
pub use maven::{parse_metadata_versions, MavenMetadataGateway};

/// A repository could not be asked for metadata. Distinct from an empty
/// answer, which means nothing has been published.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Could not read metadata for {group_artifact} from {repository}: {cause}")]
pub struct MetadataUnavailable {
    pub group_artifact: GroupArtifact,
    pub repository: String,
    pub cause: String,
}

/// Source of published versions. Implementations may block on network I/O.
pub trait MetadataGateway {
    fn fetch_versions(
        &self,
        group_artifact: &GroupArtifact,
        repositories: &[MavenRepository],
    ) -> Result<Vec<String>, MetadataUnavailable>;
}

impl<G> MetadataGateway for &G
where
    G: MetadataGateway + ?Sized,
{
    fn fetch_versions(
        &self,
        group_artifact: &GroupArtifact,
        repositories: &[MavenRepository],
    ) -> Result<Vec<String>, MetadataUnavailable> {
        (**self).fetch_versions(group_artifact, repositories)
    }
}

impl<G> MetadataGateway for Arc<G>
where
    G: MetadataGateway + ?Sized,
{
    fn fetch_versions(
        &self,
        group_artifact: &GroupArtifact,
        repositories: &[MavenRepository],
    ) -> Result<Vec<String>, MetadataUnavailable> {
        (**self).fetch_versions(group_artifact, repositories)
    }
}

impl<G> MetadataGateway for Box<G>
where
    G: MetadataGateway + ?Sized,
{
    fn fetch_versions(
        &self,
        group_artifact: &GroupArtifact,
        repositories: &[MavenRepository],
    ) -> Result<Vec<String>, MetadataUnavailable> {
        (**self).fetch_versions(group_artifact, repositories)
    }
}

/// Queries every repository and merges the answers in first-seen order.
///
/// A failing repository is skipped as long as another one answered; if none
/// did, the first failure is returned.
pub fn merge_repositories<F>(
    group_artifact: &GroupArtifact,
    repositories: &[MavenRepository],
    mut fetch: F,
) -> Result<Vec<String>, MetadataUnavailable>
where
    F: FnMut(&MavenRepository) -> Result<Vec<String>, MetadataUnavailable>,
{
    if repositories.is_empty() {
        return Err(MetadataUnavailable {
            group_artifact: group_artifact.clone(),
            repository: "<none>".to_owned(),
            cause: "no repositories are configured".to_owned(),
        });
    }

    let mut versions: Vec<String> = Vec::new();
    let mut first_failure = None;
    let mut answered = false;
    for repository in repositories {
        match fetch(repository) {
            Ok(found) => {
                answered = true;
                for version in found {
                    if !versions.contains(&version) {
                        versions.push(version);
                    }
                }
            }
            Err(error) => {
                warn!("{error}");
                first_failure.get_or_insert(error);
            }
        }
    }

    match (answered, first_failure) {
        (false, Some(error)) => Err(error),
        _ => Ok(versions),
    }
}
