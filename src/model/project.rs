use std::{
    collections::{BTreeMap, HashSet, VecDeque},
    path::Path,
    sync::Arc,
};

use log::{debug, error};
use serde::{Deserialize, Serialize};

use super::{GradleDependencyConfiguration, MavenRepository, ParseError};

/// Configuration whose dependencies are build-tool plugins rather than
/// application libraries.
pub const PLUGIN_CLASSPATH_CONFIGURATION: &str = "classpath";

/// One build module. Copy-on-write: every change produces a new project whose
/// untouched configurations are the same `Arc`s as before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradleProject {
    pub path: String,
    pub name_to_configuration: BTreeMap<String, Arc<GradleDependencyConfiguration>>,
    pub maven_repositories: Vec<MavenRepository>,
    pub maven_plugin_repositories: Vec<MavenRepository>,
}

/// On-disk layout: configurations as an ordered array.
#[derive(Debug, Serialize, Deserialize)]
struct ProjectSnapshot {
    path: String,
    #[serde(default)]
    repositories: Vec<MavenRepository>,
    #[serde(default)]
    plugin_repositories: Vec<MavenRepository>,
    #[serde(default)]
    configurations: Vec<Arc<GradleDependencyConfiguration>>,
}

impl GradleProject {
    pub fn new(path: impl Into<String>) -> Self {
        GradleProject {
            path: path.into(),
            name_to_configuration: BTreeMap::new(),
            maven_repositories: Vec::new(),
            maven_plugin_repositories: Vec::new(),
        }
    }

    pub fn configuration(&self, name: &str) -> Option<&Arc<GradleDependencyConfiguration>> {
        self.name_to_configuration.get(name)
    }

    pub fn configurations(&self) -> impl Iterator<Item = &Arc<GradleDependencyConfiguration>> {
        self.name_to_configuration.values()
    }

    /// Returns a new project with `configuration` inserted or replaced by name.
    pub fn with_configuration(&self, configuration: GradleDependencyConfiguration) -> Self {
        let mut name_to_configuration = self.name_to_configuration.clone();
        name_to_configuration.insert(configuration.name.clone(), Arc::new(configuration));
        GradleProject {
            name_to_configuration,
            ..self.clone()
        }
    }

    pub fn with_name_to_configuration(
        &self,
        name_to_configuration: BTreeMap<String, Arc<GradleDependencyConfiguration>>,
    ) -> Self {
        GradleProject {
            name_to_configuration,
            ..self.clone()
        }
    }

    pub fn with_repositories(self, repositories: Vec<MavenRepository>) -> Self {
        GradleProject {
            maven_repositories: repositories,
            ..self
        }
    }

    pub fn with_plugin_repositories(self, repositories: Vec<MavenRepository>) -> Self {
        GradleProject {
            maven_plugin_repositories: repositories,
            ..self
        }
    }

    /// Plugin and library dependencies are served by different repository lists.
    pub fn repositories_for(&self, configuration_name: &str) -> &[MavenRepository] {
        if is_plugin_classpath(configuration_name) {
            &self.maven_plugin_repositories
        } else {
            &self.maven_repositories
        }
    }

    /// Every configuration that inherits the dependencies of `name`, through
    /// any number of `extends_from` edges. Revisited nodes are skipped, so a
    /// malformed cyclic graph still terminates.
    pub fn configurations_extending_from(
        &self,
        name: &str,
        include_self: bool,
    ) -> Vec<Arc<GradleDependencyConfiguration>> {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        let mut result = Vec::new();

        visited.insert(name);
        queue.push_back(name);
        if include_self {
            if let Some(configuration) = self.name_to_configuration.get(name) {
                result.push(configuration.clone());
            }
        }

        while let Some(current) = queue.pop_front() {
            for configuration in self.name_to_configuration.values() {
                if configuration.extends_from.contains(current)
                    && visited.insert(configuration.name.as_str())
                {
                    result.push(configuration.clone());
                    queue.push_back(configuration.name.as_str());
                }
            }
        }

        result
    }

    pub fn from_file(path: &Path) -> Result<GradleProject, ParseError> {
        debug!("Reading project snapshot from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let project = GradleProject::from_toml_str(&contents);
        if let Err(err) = &project {
            error!("Could not read project snapshot {}: {err}", path.display());
        }
        project
    }

    pub fn from_toml_str(data: &str) -> Result<GradleProject, ParseError> {
        let snapshot = toml::from_str::<ProjectSnapshot>(data)?;

        let mut name_to_configuration = BTreeMap::new();
        for configuration in snapshot.configurations {
            let name = configuration.name.clone();
            if name_to_configuration
                .insert(name.clone(), configuration)
                .is_some()
            {
                return Err(ParseError::DuplicateConfiguration(name));
            }
        }

        for configuration in name_to_configuration.values() {
            if let Some(missing) = configuration
                .extends_from
                .iter()
                .find(|parent| !name_to_configuration.contains_key(parent.as_str()))
            {
                return Err(ParseError::UnknownConfiguration {
                    name: missing.clone(),
                    referenced_by: configuration.name.clone(),
                });
            }
        }

        Ok(GradleProject {
            path: snapshot.path,
            name_to_configuration,
            maven_repositories: snapshot.repositories,
            maven_plugin_repositories: snapshot.plugin_repositories,
        })
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&ProjectSnapshot {
            path: self.path.clone(),
            repositories: self.maven_repositories.clone(),
            plugin_repositories: self.maven_plugin_repositories.clone(),
            configurations: self.name_to_configuration.values().cloned().collect(),
        })
    }
}

pub fn is_plugin_classpath(configuration_name: &str) -> bool {
    configuration_name == PLUGIN_CLASSPATH_CONFIGURATION
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    use crate::model::{GroupArtifactVersion, RequestedDependency};
    use pretty_assertions::assert_eq;

    fn configuration(name: &str, extends_from: &[&str]) -> GradleDependencyConfiguration {
        GradleDependencyConfiguration {
            extends_from: extends_from.iter().map(|s| s.to_string()).collect(),
            ..GradleDependencyConfiguration::new(name)
        }
    }

    fn names(configurations: Vec<Arc<GradleDependencyConfiguration>>) -> BTreeSet<String> {
        configurations.iter().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn extending_from_is_transitive_regardless_of_declaration_order() {
        let project = GradleProject::new(":app")
            .with_configuration(configuration("c", &[]))
            .with_configuration(configuration("a", &["b"]))
            .with_configuration(configuration("b", &["c"]))
            .with_configuration(configuration("unrelated", &[]));

        assert_eq!(
            names(project.configurations_extending_from("c", false)),
            BTreeSet::from(["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            names(project.configurations_extending_from("c", true)),
            BTreeSet::from(["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert!(project.configurations_extending_from("a", false).is_empty());
    }

    #[test]
    fn extending_from_terminates_on_cycles() {
        let project = GradleProject::new(":app")
            .with_configuration(configuration("a", &["b"]))
            .with_configuration(configuration("b", &["a"]));

        assert_eq!(
            names(project.configurations_extending_from("a", false)),
            BTreeSet::from(["b".to_string()])
        );
        assert_eq!(
            names(project.configurations_extending_from("a", true)),
            BTreeSet::from(["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn plugin_configurations_use_plugin_repositories() {
        let project = GradleProject::new(":")
            .with_repositories(vec![MavenRepository::maven_central()])
            .with_plugin_repositories(vec![MavenRepository::new(
                "gradlePluginPortal",
                "https://plugins.gradle.org/m2",
            )]);

        assert_eq!(project.repositories_for("classpath")[0].id, "gradlePluginPortal");
        assert_eq!(project.repositories_for("implementation")[0].id, "central");
    }

    #[test]
    fn load_project_snapshot() {
        let text = r#"
            path = ":app"

            [[repositories]]
            id = "central"
            url = "https://repo.maven.apache.org/maven2"

            [[configurations]]
            name = "implementation"

            [[configurations.requested]]
            group = "com.google.guava"
            artifact = "guava"
            version = "29.0-jre"
            configuration = "implementation"

            [[configurations]]
            name = "testImplementation"
            extends_from = ["implementation"]
        "#;
        let project = GradleProject::from_toml_str(text).unwrap();
        assert_eq!(project.path, ":app");
        assert_eq!(project.maven_repositories, vec![MavenRepository::maven_central()]);
        assert_eq!(
            project.configuration("implementation").unwrap().requested,
            vec![RequestedDependency::new(
                GroupArtifactVersion::new("com.google.guava", "guava", Some("29.0-jre".into())),
                "implementation"
            )]
        );

        let reparsed = GradleProject::from_toml_str(&project.to_toml_string().unwrap()).unwrap();
        assert_eq!(reparsed, project);
    }

    #[test]
    fn reject_unknown_parent_configuration() {
        let text = r#"
            path = ":app"

            [[configurations]]
            name = "testImplementation"
            extends_from = ["implementation"]
        "#;
        assert!(matches!(
            GradleProject::from_toml_str(text),
            Err(ParseError::UnknownConfiguration { .. })
        ));
    }
}
