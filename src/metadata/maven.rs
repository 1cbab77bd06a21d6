use std::{sync::OnceLock, time::Duration};

use log::{debug, trace};
use regex_lite::Regex;
use reqwest::{blocking::Client, StatusCode};

use crate::{
    model::{GroupArtifact, MavenRepository},
    version::cached_regex,
};

use super::{merge_repositories, MetadataGateway, MetadataUnavailable};

const METADATA_FILE_NAME: &str = "maven-metadata.xml";

/// Reads `maven-metadata.xml` documents over HTTP.
pub struct MavenMetadataGateway {
    client: Client,
}

impl MavenMetadataGateway {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(MavenMetadataGateway { client })
    }

    pub fn metadata_url(repository: &MavenRepository, group_artifact: &GroupArtifact) -> String {
        format!(
            "{}/{}/{}/{}",
            repository.base_url(),
            group_artifact.group.replace('.', "/"),
            group_artifact.artifact,
            METADATA_FILE_NAME
        )
    }

    fn fetch_from(
        &self,
        group_artifact: &GroupArtifact,
        repository: &MavenRepository,
    ) -> Result<Vec<String>, MetadataUnavailable> {
        let unavailable = |cause: String| MetadataUnavailable {
            group_artifact: group_artifact.clone(),
            repository: repository.to_string(),
            cause,
        };

        let url = Self::metadata_url(repository, group_artifact);
        trace!("Requesting {}", url);
        let mut request = self.client.get(&url);
        if let Some(credentials) = &repository.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request.send().map_err(|e| unavailable(e.to_string()))?;
        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(unavailable(format!(
                    "access denied ({})",
                    response.status()
                )))
            }
            status => return Err(unavailable(format!("unexpected status {status}"))),
        }

        let body = response.text().map_err(|e| unavailable(e.to_string()))?;
        let versions = parse_metadata_versions(&body);
        debug!(
            "{} lists {} versions of {}",
            repository.id,
            versions.len(),
            group_artifact
        );
        Ok(versions)
    }
}

impl MetadataGateway for MavenMetadataGateway {
    fn fetch_versions(
        &self,
        group_artifact: &GroupArtifact,
        repositories: &[MavenRepository],
    ) -> Result<Vec<String>, MetadataUnavailable> {
        merge_repositories(group_artifact, repositories, |repository| {
            self.fetch_from(group_artifact, repository)
        })
    }
}

/// Extracts the `<versions>` list of a metadata document, falling back to any
/// `<version>` element when the list is missing.
pub fn parse_metadata_versions(document: &str) -> Vec<String> {
    static VERSION: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(version) = cached_regex(&VERSION, || {
        r"<version>\s*([^<\s]+)\s*</version>".to_owned()
    }) else {
        return Vec::new();
    };
    let scope = document
        .find("<versions>")
        .and_then(|start| {
            document[start..]
                .find("</versions>")
                .map(|end| &document[start..start + end])
        })
        .unwrap_or(document);

    let mut versions: Vec<String> = Vec::new();
    for captures in version.captures_iter(scope) {
        let found = captures[1].to_owned();
        if !versions.contains(&found) {
            versions.push(found);
        }
    }
    versions
}
