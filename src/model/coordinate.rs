use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct GroupArtifact {
    pub group: String,
    pub artifact: String,
}

impl GroupArtifact {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        GroupArtifact {
            group: group.into(),
            artifact: artifact.into(),
        }
    }

    pub fn with_group(&self, group: impl Into<String>) -> Self {
        GroupArtifact {
            group: group.into(),
            artifact: self.artifact.clone(),
        }
    }

    pub fn with_artifact(&self, artifact: impl Into<String>) -> Self {
        GroupArtifact {
            group: self.group.clone(),
            artifact: artifact.into(),
        }
    }
}

impl Display for GroupArtifact {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

/// A requested coordinate. The version may be absent (managed by a platform),
/// a literal, a dynamic selector or a property placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct GroupArtifactVersion {
    #[serde(flatten)]
    pub group_artifact: GroupArtifact,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<String>,
}

impl GroupArtifactVersion {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: Option<String>,
    ) -> Self {
        GroupArtifactVersion {
            group_artifact: GroupArtifact::new(group, artifact),
            version,
        }
    }

    pub fn group(&self) -> &str {
        &self.group_artifact.group
    }

    pub fn artifact(&self) -> &str {
        &self.group_artifact.artifact
    }

    pub fn with_group_artifact(&self, group_artifact: GroupArtifact) -> Self {
        GroupArtifactVersion {
            group_artifact,
            version: self.version.clone(),
        }
    }

    pub fn with_version(&self, version: Option<String>) -> Self {
        GroupArtifactVersion {
            group_artifact: self.group_artifact.clone(),
            version,
        }
    }
}

impl Display for GroupArtifactVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{}", self.group_artifact, version),
            None => write!(f, "{}", self.group_artifact),
        }
    }
}

/// The coordinate a build tool actually resolved. Always versioned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ResolvedGroupArtifactVersion {
    #[serde(flatten)]
    pub group_artifact: GroupArtifact,
    pub version: String,
    /// Timestamped form of a `-SNAPSHOT` version, when the repository published one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dated_snapshot_version: Option<String>,
}

impl ResolvedGroupArtifactVersion {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        ResolvedGroupArtifactVersion {
            group_artifact: GroupArtifact::new(group, artifact),
            version: version.into(),
            dated_snapshot_version: None,
        }
    }

    pub fn with_group_artifact(&self, group_artifact: GroupArtifact) -> Self {
        ResolvedGroupArtifactVersion {
            group_artifact,
            ..self.clone()
        }
    }

    /// A new version invalidates any snapshot timestamp of the old one.
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        ResolvedGroupArtifactVersion {
            group_artifact: self.group_artifact.clone(),
            version: version.into(),
            dated_snapshot_version: None,
        }
    }

    pub fn as_requested(&self) -> GroupArtifactVersion {
        GroupArtifactVersion {
            group_artifact: self.group_artifact.clone(),
            version: Some(self.version.clone()),
        }
    }
}

impl Display for ResolvedGroupArtifactVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group_artifact, self.version)
    }
}
