use std::{fmt::Display, sync::Arc};

use serde::{Deserialize, Serialize};

use super::{GroupArtifact, GroupArtifactVersion, ResolvedGroupArtifactVersion};

/// A dependency as declared in a build script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestedDependency {
    #[serde(flatten)]
    pub gav: GroupArtifactVersion,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub classifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub depth: u32,
    /// Name of the configuration that declared this dependency.
    pub configuration: String,
}

impl RequestedDependency {
    pub fn new(gav: GroupArtifactVersion, configuration: impl Into<String>) -> Self {
        RequestedDependency {
            gav,
            classifier: None,
            extension: None,
            depth: 0,
            configuration: configuration.into(),
        }
    }

    pub fn group_artifact(&self) -> &GroupArtifact {
        &self.gav.group_artifact
    }

    pub fn version(&self) -> Option<&str> {
        self.gav.version.as_deref()
    }

    pub fn with_gav(&self, gav: GroupArtifactVersion) -> Self {
        RequestedDependency {
            gav,
            ..self.clone()
        }
    }
}

impl Display for RequestedDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.gav)
    }
}

/// A node of the closure computed by a prior resolution.
///
/// Children are shared: the same library typically appears under many
/// configurations, so rewritten nodes are memoised by the mutation engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedDependency {
    #[serde(flatten)]
    pub gav: ResolvedGroupArtifactVersion,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub classifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub dependencies: Vec<Arc<ResolvedDependency>>,
    #[serde(default)]
    pub depth: u32,
}

impl ResolvedDependency {
    pub fn new(gav: ResolvedGroupArtifactVersion) -> Self {
        ResolvedDependency {
            gav,
            classifier: None,
            extension: None,
            dependencies: Vec::new(),
            depth: 0,
        }
    }

    pub fn group_artifact(&self) -> &GroupArtifact {
        &self.gav.group_artifact
    }

    pub fn version(&self) -> &str {
        &self.gav.version
    }

    pub fn with_gav(&self, gav: ResolvedGroupArtifactVersion) -> Self {
        ResolvedDependency {
            gav,
            ..self.clone()
        }
    }

    pub fn with_dependencies(&self, dependencies: Vec<Arc<ResolvedDependency>>) -> Self {
        ResolvedDependency {
            dependencies,
            ..self.clone()
        }
    }

    /// Depth-first search through this node and its transitive children.
    pub fn find_dependency(&self, group_artifact: &GroupArtifact) -> Option<&ResolvedDependency> {
        if self.group_artifact() == group_artifact {
            return Some(self);
        }
        self.dependencies
            .iter()
            .find_map(|child| child.find_dependency(group_artifact))
    }
}

impl Display for ResolvedDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.gav)
    }
}
