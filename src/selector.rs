use std::fmt::Display;

use log::{debug, warn};
use thiserror::Error;

use crate::{
    metadata::{MetadataGateway, MetadataUnavailable},
    model::{GradleProject, GroupArtifact, GroupArtifactVersion, MavenRepository},
    version::{InvalidSelector, VersionComparator},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error(transparent)]
    InvalidSelector(#[from] InvalidSelector),
    #[error("{0} has no version to upgrade from; select a version for a new dependency instead")]
    IllegalSelector(GroupArtifact),
    #[error(transparent)]
    MetadataUnavailable(#[from] MetadataUnavailable),
}

/// Result of trying to upgrade one dependency occurrence, in a form the
/// caller can attach to the affected build-file node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    Upgraded {
        group_artifact: GroupArtifact,
        version: String,
    },
    UpToDate {
        group_artifact: GroupArtifact,
    },
    Unavailable {
        group_artifact: GroupArtifact,
        reason: MetadataUnavailable,
    },
}

impl UpgradeOutcome {
    pub fn new_version(&self) -> Option<&str> {
        match self {
            UpgradeOutcome::Upgraded { version, .. } => Some(version),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, UpgradeOutcome::Unavailable { .. })
    }
}

impl Display for UpgradeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpgradeOutcome::Upgraded {
                group_artifact,
                version,
            } => write!(f, "{group_artifact} can be upgraded to {version}"),
            UpgradeOutcome::UpToDate { group_artifact } => {
                write!(f, "{group_artifact} is already on the latest version")
            }
            UpgradeOutcome::Unavailable {
                group_artifact,
                reason,
            } => write!(
                f,
                "could not determine a new version for {group_artifact}; left unchanged ({})",
                reason.cause
            ),
        }
    }
}

/// Answers "what version should this dependency become?" for one project.
pub struct DependencyVersionSelector<'a, G> {
    project: &'a GradleProject,
    gateway: G,
    default_repositories: Vec<MavenRepository>,
}

impl<'a, G> DependencyVersionSelector<'a, G>
where
    G: MetadataGateway,
{
    pub fn new(project: &'a GradleProject, gateway: G) -> Self {
        DependencyVersionSelector {
            project,
            gateway,
            default_repositories: Vec::new(),
        }
    }

    /// Repositories queried when the project declares none for a configuration.
    pub fn with_default_repositories(self, default_repositories: Vec<MavenRepository>) -> Self {
        DependencyVersionSelector {
            default_repositories,
            ..self
        }
    }

    pub fn repositories_for(&self, configuration_name: &str) -> &[MavenRepository] {
        let declared = self.project.repositories_for(configuration_name);
        if declared.is_empty() {
            &self.default_repositories
        } else {
            declared
        }
    }

    pub fn select_for_new_dependency(
        &self,
        group_artifact: &GroupArtifact,
        configuration_name: &str,
        selector: &str,
        pattern: Option<&str>,
    ) -> Result<Option<String>, SelectionError> {
        let comparator = VersionComparator::parse(selector, pattern)?;
        self.select_new_with(&comparator, group_artifact, configuration_name)
    }

    pub fn select_for_upgrade(
        &self,
        current: &GroupArtifactVersion,
        configuration_name: &str,
        selector: &str,
        pattern: Option<&str>,
    ) -> Result<Option<String>, SelectionError> {
        let comparator = VersionComparator::parse(selector, pattern)?;
        self.select_upgrade_with(&comparator, current, configuration_name)
    }

    /// Same as [`Self::select_for_new_dependency`] with an already parsed selector.
    pub fn select_new_with(
        &self,
        comparator: &VersionComparator,
        group_artifact: &GroupArtifact,
        configuration_name: &str,
    ) -> Result<Option<String>, SelectionError> {
        let comparator = comparator.clone().for_new_dependency();
        if let VersionComparator::Exact(version) = &comparator {
            return Ok(Some(version.clone()));
        }

        let versions = self.fetch(group_artifact, configuration_name)?;
        let selected = comparator.upgrade(None, versions.iter().map(String::as_str));
        debug!(
            "Selected {:?} for new dependency {} using {}",
            selected, group_artifact, comparator
        );
        Ok(selected)
    }

    /// Same as [`Self::select_for_upgrade`] with an already parsed selector.
    pub fn select_upgrade_with(
        &self,
        comparator: &VersionComparator,
        current: &GroupArtifactVersion,
        configuration_name: &str,
    ) -> Result<Option<String>, SelectionError> {
        let current_version = current
            .version
            .as_deref()
            .ok_or_else(|| SelectionError::IllegalSelector(current.group_artifact.clone()))?;

        if let VersionComparator::Exact(version) = comparator {
            return Ok((version != current_version).then(|| version.clone()));
        }

        let versions = self.fetch(&current.group_artifact, configuration_name)?;
        let selected = comparator.upgrade(Some(current_version), versions.iter().map(String::as_str));
        debug!(
            "Selected {:?} to upgrade {} using {}",
            selected, current, comparator
        );
        Ok(selected)
    }

    /// Like [`Self::select_upgrade_with`], but turns a metadata failure into an
    /// outcome the caller reports instead of aborting the run.
    pub fn outcome_for_upgrade(
        &self,
        comparator: &VersionComparator,
        current: &GroupArtifactVersion,
        configuration_name: &str,
    ) -> Result<UpgradeOutcome, SelectionError> {
        let group_artifact = current.group_artifact.clone();
        match self.select_upgrade_with(comparator, current, configuration_name) {
            Ok(Some(version)) => Ok(UpgradeOutcome::Upgraded {
                group_artifact,
                version,
            }),
            Ok(None) => Ok(UpgradeOutcome::UpToDate { group_artifact }),
            Err(SelectionError::MetadataUnavailable(reason)) => {
                let outcome = UpgradeOutcome::Unavailable {
                    group_artifact,
                    reason,
                };
                warn!("{outcome}");
                Ok(outcome)
            }
            Err(other) => Err(other),
        }
    }

    fn fetch(
        &self,
        group_artifact: &GroupArtifact,
        configuration_name: &str,
    ) -> Result<Vec<String>, MetadataUnavailable> {
        self.gateway
            .fetch_versions(group_artifact, self.repositories_for(configuration_name))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    use crate::model::{MavenRepository, PLUGIN_CLASSPATH_CONFIGURATION};
    use pretty_assertions::assert_eq;

    /// Records the repositories of every call.
    struct RecordingGateway {
        versions: Vec<&'static str>,
        fail: bool,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl RecordingGateway {
        fn new(versions: &[&'static str]) -> Self {
            RecordingGateway {
                versions: versions.to_vec(),
                fail: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            RecordingGateway {
                fail: true,
                ..RecordingGateway::new(&[])
            }
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl MetadataGateway for RecordingGateway {
        fn fetch_versions(
            &self,
            group_artifact: &GroupArtifact,
            repositories: &[MavenRepository],
        ) -> Result<Vec<String>, MetadataUnavailable> {
            self.calls
                .lock()
                .unwrap()
                .push(repositories.iter().map(|r| r.id.clone()).collect());
            if self.fail {
                return Err(MetadataUnavailable {
                    group_artifact: group_artifact.clone(),
                    repository: "central".to_owned(),
                    cause: "401 Unauthorized".to_owned(),
                });
            }
            Ok(self.versions.iter().map(|v| v.to_string()).collect())
        }
    }

    fn project() -> GradleProject {
        GradleProject::new(":app")
            .with_repositories(vec![MavenRepository::maven_central()])
            .with_plugin_repositories(vec![MavenRepository::new(
                "gradlePluginPortal",
                "https://plugins.gradle.org/m2",
            )])
    }

    fn guava(version: Option<&str>) -> GroupArtifactVersion {
        GroupArtifactVersion::new("com.google.guava", "guava", version.map(str::to_owned))
    }

    #[test]
    fn exact_selector_never_fetches() {
        let project = project();
        let gateway = RecordingGateway::new(&["1.2.3", "1.2.5", "1.3.0"]);
        let selector = DependencyVersionSelector::new(&project, &gateway);

        assert_eq!(
            selector
                .select_for_upgrade(&guava(Some("1.2.3")), "implementation", "1.2.5", None)
                .unwrap(),
            Some("1.2.5".to_owned())
        );
        assert_eq!(
            selector
                .select_for_new_dependency(
                    &GroupArtifact::new("com.google.guava", "guava"),
                    "implementation",
                    "1.2.5",
                    None
                )
                .unwrap(),
            Some("1.2.5".to_owned())
        );
        assert_eq!(
            selector
                .select_for_upgrade(&guava(Some("1.2.5")), "implementation", "1.2.5", None)
                .unwrap(),
            None
        );
        assert_eq!(
            selector
                .select_for_upgrade(&guava(Some("3.3.6")), "implementation", "3.3.7-1", None)
                .unwrap(),
            Some("3.3.7-1".to_owned())
        );
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn latest_release_with_pattern() {
        let project = project();
        let gateway = RecordingGateway::new(&["29.0", "29.0-jre", "30.0-android"]);
        let selector = DependencyVersionSelector::new(&project, &gateway);

        assert_eq!(
            selector
                .select_for_upgrade(&guava(Some("28.0-jre")), "implementation", "latest.release", Some("-jre"))
                .unwrap(),
            Some("29.0-jre".to_owned())
        );
    }

    #[test]
    fn latest_patch_for_new_dependency_uses_latest_release() {
        let project = project();
        let gateway = RecordingGateway::new(&["1.2.4", "1.3.0", "2.0.0"]);
        let selector = DependencyVersionSelector::new(&project, &gateway);

        assert_eq!(
            selector
                .select_for_new_dependency(
                    &GroupArtifact::new("org.example", "lib"),
                    "implementation",
                    "latest.patch",
                    None
                )
                .unwrap(),
            Some("2.0.0".to_owned())
        );
        assert_eq!(
            selector
                .select_for_upgrade(
                    &GroupArtifactVersion::new("org.example", "lib", Some("1.2.3".into())),
                    "implementation",
                    "latest.patch",
                    None
                )
                .unwrap(),
            Some("1.2.4".to_owned())
        );
    }

    #[test]
    fn range_without_match_is_absent() {
        let project = project();
        let gateway = RecordingGateway::new(&["6.1.0", "7.0.0"]);
        let selector = DependencyVersionSelector::new(&project, &gateway);

        assert_eq!(
            selector
                .select_for_upgrade(&guava(Some("5.0")), "implementation", "[5.0,6.0)", None)
                .unwrap(),
            None
        );
    }

    #[test]
    fn upgrade_requires_current_version() {
        let project = project();
        let gateway = RecordingGateway::new(&["1.0"]);
        let selector = DependencyVersionSelector::new(&project, &gateway);

        assert_eq!(
            selector
                .select_for_upgrade(&guava(None), "implementation", "latest.release", None)
                .unwrap_err(),
            SelectionError::IllegalSelector(GroupArtifact::new("com.google.guava", "guava"))
        );
    }

    #[test]
    fn invalid_selector_is_reported_before_fetching() {
        let project = project();
        let gateway = RecordingGateway::new(&["1.0"]);
        let selector = DependencyVersionSelector::new(&project, &gateway);

        assert!(matches!(
            selector.select_for_upgrade(&guava(Some("1.0")), "implementation", "newest", None),
            Err(SelectionError::InvalidSelector(_))
        ));
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn plugin_and_library_repositories_stay_separate() {
        let project = project();
        let gateway = RecordingGateway::new(&["1.0", "2.0"]);
        let selector = DependencyVersionSelector::new(&project, &gateway);
        let current = GroupArtifactVersion::new("com.diffplug.spotless", "spotless-plugin-gradle", Some("1.0".into()));

        selector
            .select_for_upgrade(&current, PLUGIN_CLASSPATH_CONFIGURATION, "latest.release", None)
            .unwrap();
        selector
            .select_for_upgrade(&current, "implementation", "latest.release", None)
            .unwrap();

        assert_eq!(
            gateway.calls(),
            vec![vec!["gradlePluginPortal".to_owned()], vec!["central".to_owned()]]
        );
    }

    #[test]
    fn fall_back_to_default_repositories() {
        let project = GradleProject::new(":app");
        let gateway = RecordingGateway::new(&["1.0", "2.0"]);
        let selector = DependencyVersionSelector::new(&project, &gateway)
            .with_default_repositories(vec![MavenRepository::new("fixture", "https://fixture.example")]);

        selector
            .select_for_upgrade(&guava(Some("1.0")), "implementation", "latest.release", None)
            .unwrap();
        assert_eq!(gateway.calls(), vec![vec!["fixture".to_owned()]]);
    }

    #[test]
    fn metadata_failure_is_distinguishable_from_up_to_date() {
        let project = project();
        let comparator = VersionComparator::parse("latest.release", None).unwrap();

        let failing = RecordingGateway::failing();
        let selector = DependencyVersionSelector::new(&project, &failing);
        assert!(matches!(
            selector.select_for_upgrade(&guava(Some("1.0")), "implementation", "latest.release", None),
            Err(SelectionError::MetadataUnavailable(_))
        ));
        let outcome = selector
            .outcome_for_upgrade(&comparator, &guava(Some("1.0")), "implementation")
            .unwrap();
        assert!(outcome.is_unavailable());
        assert_eq!(
            outcome.to_string(),
            "could not determine a new version for com.google.guava:guava; left unchanged (401 Unauthorized)"
        );

        let up_to_date = RecordingGateway::new(&["1.0"]);
        let selector = DependencyVersionSelector::new(&project, &up_to_date);
        let outcome = selector
            .outcome_for_upgrade(&comparator, &guava(Some("1.0")), "implementation")
            .unwrap();
        assert_eq!(
            outcome.to_string(),
            "com.google.guava:guava is already on the latest version"
        );
        assert_eq!(outcome.new_version(), None);
    }
}
