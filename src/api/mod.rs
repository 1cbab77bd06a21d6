use crate::{
    metadata::{CachingMetadataGateway, MavenMetadataGateway, MetadataGateway},
    model::{GradleProject, GroupArtifact, GroupArtifactVersion, MavenRepository},
    mutation::{Mutation, MutationEngine, MutationError, MutationOutcome},
    selector::{DependencyVersionSelector, SelectionError, UpgradeOutcome},
    version::VersionComparator,
};

mod builder;

pub use builder::DependencyModelBuilder;

/// Entry point bundling a metadata gateway with the repositories used for
/// projects that declare none.
pub struct DependencyModel<G = CachingMetadataGateway<MavenMetadataGateway>> {
    gateway: G,
    default_repositories: Vec<MavenRepository>,
}

impl DependencyModel {
    pub fn builder() -> DependencyModelBuilder {
        DependencyModelBuilder::default()
    }
}

impl<G> DependencyModel<G>
where
    G: MetadataGateway,
{
    /// Uses `gateway` as is, without the HTTP client or cache the builder sets up.
    pub fn with_gateway(gateway: G, default_repositories: Vec<MavenRepository>) -> Self {
        DependencyModel {
            gateway,
            default_repositories,
        }
    }

    pub fn default_repositories(&self) -> &[MavenRepository] {
        &self.default_repositories
    }

    pub fn selector<'p>(&'p self, project: &'p GradleProject) -> DependencyVersionSelector<'p, &'p G> {
        DependencyVersionSelector::new(project, &self.gateway)
            .with_default_repositories(self.default_repositories.clone())
    }

    /// Picks a version for a dependency that is about to be added.
    pub fn select_new_version(
        &self,
        project: &GradleProject,
        group_artifact: &GroupArtifact,
        configuration_name: &str,
        selector: &str,
        pattern: Option<&str>,
    ) -> Result<Option<String>, SelectionError> {
        self.selector(project).select_for_new_dependency(
            group_artifact,
            configuration_name,
            selector,
            pattern,
        )
    }

    /// Decides whether `current` can move to a newer version. A repository
    /// outage becomes [`UpgradeOutcome::Unavailable`] rather than an error.
    pub fn upgrade_outcome(
        &self,
        project: &GradleProject,
        current: &GroupArtifactVersion,
        configuration_name: &str,
        selector: &str,
        pattern: Option<&str>,
    ) -> Result<UpgradeOutcome, SelectionError> {
        let comparator = VersionComparator::parse(selector, pattern)?;
        self.selector(project)
            .outcome_for_upgrade(&comparator, current, configuration_name)
    }

    pub fn apply(
        &self,
        project: &GradleProject,
        mutation: Mutation,
    ) -> Result<MutationOutcome, MutationError> {
        Ok(MutationEngine::new(mutation)?.apply(project))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{matcher::DependencyMatcher, metadata::MetadataUnavailable};
    use pretty_assertions::assert_eq;

    struct StaticGateway(Vec<&'static str>);

    impl MetadataGateway for StaticGateway {
        fn fetch_versions(
            &self,
            _group_artifact: &GroupArtifact,
            repositories: &[MavenRepository],
        ) -> Result<Vec<String>, MetadataUnavailable> {
            assert_eq!(repositories[0].id, "fallback");
            Ok(self.0.iter().map(|v| v.to_string()).collect())
        }
    }

    fn model() -> DependencyModel<StaticGateway> {
        DependencyModel::with_gateway(
            StaticGateway(vec!["1.0", "1.1", "2.0-rc1"]),
            vec![MavenRepository::new("fallback", "https://fallback.example")],
        )
    }

    #[test]
    fn select_through_default_repositories() {
        let project = GradleProject::new(":app");
        assert_eq!(
            model()
                .select_new_version(
                    &project,
                    &GroupArtifact::new("org.example", "lib"),
                    "implementation",
                    "latest.release",
                    None
                )
                .unwrap(),
            Some("1.1".to_owned())
        );

        let outcome = model()
            .upgrade_outcome(
                &project,
                &GroupArtifactVersion::new("org.example", "lib", Some("1.1".to_owned())),
                "implementation",
                "latest.release",
                None,
            )
            .unwrap();
        assert_eq!(
            outcome,
            UpgradeOutcome::UpToDate {
                group_artifact: GroupArtifact::new("org.example", "lib")
            }
        );
    }

    #[test]
    fn apply_rejects_no_op() {
        let result = model().apply(
            &GradleProject::new(":app"),
            Mutation::Rename {
                matcher: DependencyMatcher::new("org.example", "lib"),
                new_group: None,
                new_artifact: None,
            },
        );
        assert!(matches!(result, Err(MutationError::NoOpMutation { .. })));
    }
}
