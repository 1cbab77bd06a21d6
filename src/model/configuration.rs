use std::{
    collections::{BTreeSet, HashSet},
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use super::{GroupArtifact, RequestedDependency, ResolvedDependency};

/// A named dependency bucket such as `implementation` or `testRuntimeClasspath`.
///
/// Configurations are values: any change to one of the dependency lists
/// produces a new configuration so untouched ones can stay shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradleDependencyConfiguration {
    pub name: String,
    #[serde(default)]
    pub can_be_resolved: bool,
    #[serde(default)]
    pub extends_from: BTreeSet<String>,
    #[serde(default)]
    pub requested: Vec<RequestedDependency>,
    #[serde(default)]
    pub direct_resolved: Vec<Arc<ResolvedDependency>>,
}

impl GradleDependencyConfiguration {
    pub fn new(name: impl Into<String>) -> Self {
        GradleDependencyConfiguration {
            name: name.into(),
            can_be_resolved: false,
            extends_from: BTreeSet::new(),
            requested: Vec::new(),
            direct_resolved: Vec::new(),
        }
    }

    pub fn with_requested(&self, requested: Vec<RequestedDependency>) -> Self {
        GradleDependencyConfiguration {
            requested,
            ..self.clone()
        }
    }

    pub fn with_direct_resolved(&self, direct_resolved: Vec<Arc<ResolvedDependency>>) -> Self {
        GradleDependencyConfiguration {
            direct_resolved,
            ..self.clone()
        }
    }

    pub fn find_requested_dependency(
        &self,
        group: &str,
        artifact: &str,
    ) -> Option<&RequestedDependency> {
        self.requested
            .iter()
            .find(|dependency| dependency.gav.group() == group && dependency.gav.artifact() == artifact)
    }

    /// Looks through direct dependencies first, then the whole closure.
    pub fn find_resolved_dependency(
        &self,
        group: &str,
        artifact: &str,
    ) -> Option<&ResolvedDependency> {
        let group_artifact = GroupArtifact::new(group, artifact);
        self.direct_resolved
            .iter()
            .find(|dependency| dependency.group_artifact() == &group_artifact)
            .map(Arc::as_ref)
            .or_else(|| {
                self.direct_resolved
                    .iter()
                    .find_map(|dependency| dependency.find_dependency(&group_artifact))
            })
    }

    /// The flattened closure of `direct_resolved`, depth first, keeping the
    /// first occurrence of every coordinate.
    pub fn resolved(&self) -> Vec<Arc<ResolvedDependency>> {
        fn visit(
            dependency: &Arc<ResolvedDependency>,
            seen: &mut HashSet<(GroupArtifact, String)>,
            out: &mut Vec<Arc<ResolvedDependency>>,
        ) {
            let key = (
                dependency.group_artifact().clone(),
                dependency.version().to_owned(),
            );
            if !seen.insert(key) {
                return;
            }
            out.push(dependency.clone());
            for child in &dependency.dependencies {
                visit(child, seen, out);
            }
        }

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for dependency in &self.direct_resolved {
            visit(dependency, &mut seen, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::{GroupArtifactVersion, ResolvedGroupArtifactVersion};
    use pretty_assertions::assert_eq;

    fn resolved(group: &str, artifact: &str, version: &str) -> ResolvedDependency {
        ResolvedDependency::new(ResolvedGroupArtifactVersion::new(group, artifact, version))
    }

    #[test]
    fn resolved_flattens_and_deduplicates() {
        let failureaccess = Arc::new(resolved("com.google.guava", "failureaccess", "1.0.1"));
        let guava = Arc::new(
            resolved("com.google.guava", "guava", "29.0-jre")
                .with_dependencies(vec![failureaccess.clone()]),
        );
        let other = Arc::new(
            resolved("org.example", "uses-guava", "1.0").with_dependencies(vec![guava.clone()]),
        );
        let configuration = GradleDependencyConfiguration::new("runtimeClasspath")
            .with_direct_resolved(vec![guava.clone(), other.clone()]);

        let names: Vec<String> = configuration
            .resolved()
            .iter()
            .map(|d| d.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "com.google.guava:guava:29.0-jre",
                "com.google.guava:failureaccess:1.0.1",
                "org.example:uses-guava:1.0",
            ]
        );
    }

    #[test]
    fn find_dependencies_by_group_artifact() {
        let child = Arc::new(resolved("org.slf4j", "slf4j-api", "2.0.9"));
        let configuration = GradleDependencyConfiguration::new("implementation")
            .with_requested(vec![RequestedDependency::new(
                GroupArtifactVersion::new("ch.qos.logback", "logback-classic", Some("1.4.11".into())),
                "implementation",
            )])
            .with_direct_resolved(vec![Arc::new(
                resolved("ch.qos.logback", "logback-classic", "1.4.11")
                    .with_dependencies(vec![child]),
            )]);

        assert!(configuration
            .find_requested_dependency("ch.qos.logback", "logback-classic")
            .is_some());
        assert!(configuration
            .find_requested_dependency("org.slf4j", "slf4j-api")
            .is_none());
        assert_eq!(
            configuration
                .find_resolved_dependency("org.slf4j", "slf4j-api")
                .map(|d| d.version()),
            Some("2.0.9")
        );
    }
}
