use dashmap::DashMap;
use log::trace;

use crate::model::{GroupArtifact, MavenRepository};

use super::{MetadataGateway, MetadataUnavailable};

type CacheKey = (GroupArtifact, Vec<String>);

/// Remembers successful answers of the wrapped gateway for the lifetime of
/// one run. Failures are not cached so a later call may retry.
pub struct CachingMetadataGateway<G> {
    inner: G,
    entries: DashMap<CacheKey, Vec<String>>,
}

impl<G> CachingMetadataGateway<G> {
    pub fn new(inner: G) -> Self {
        CachingMetadataGateway {
            inner,
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl<G> MetadataGateway for CachingMetadataGateway<G>
where
    G: MetadataGateway,
{
    fn fetch_versions(
        &self,
        group_artifact: &GroupArtifact,
        repositories: &[MavenRepository],
    ) -> Result<Vec<String>, MetadataUnavailable> {
        let key = (
            group_artifact.clone(),
            repositories.iter().map(|r| r.url.clone()).collect(),
        );
        if let Some(versions) = self.entries.get(&key) {
            trace!("Metadata cache hit for {}", group_artifact);
            return Ok(versions.clone());
        }

        // The shard lock is not held while fetching; two threads racing on the
        // same key both fetch and store the same answer.
        let versions = self.inner.fetch_versions(group_artifact, repositories)?;
        self.entries.insert(key, versions.clone());
        Ok(versions)
    }
}
