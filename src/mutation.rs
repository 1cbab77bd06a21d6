use std::{collections::HashMap, fmt::Display, sync::Arc};

use log::{debug, trace};
use thiserror::Error;

use crate::{
    matcher::DependencyMatcher,
    model::{
        GradleDependencyConfiguration, GradleProject, GroupArtifact, RequestedDependency,
        ResolvedDependency, ResolvedGroupArtifactVersion,
    },
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    #[error("Changing {matcher} to {target} would not change anything")]
    NoOpMutation { matcher: String, target: String },
    #[error("Dependency pattern `{0}` must name both a group and an artifact")]
    InvalidPattern(String),
    #[error("New version for {0} is empty")]
    EmptyVersion(String),
}

/// A coordinate-level edit applied across a whole project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Change group and/or artifact; `None` keeps the existing value.
    Rename {
        matcher: DependencyMatcher,
        new_group: Option<String>,
        new_artifact: Option<String>,
    },
    Reversion {
        matcher: DependencyMatcher,
        new_version: String,
    },
    Remove {
        matcher: DependencyMatcher,
    },
}

impl Mutation {
    pub fn matcher(&self) -> &DependencyMatcher {
        match self {
            Mutation::Rename { matcher, .. }
            | Mutation::Reversion { matcher, .. }
            | Mutation::Remove { matcher } => matcher,
        }
    }

    fn validate(&self) -> Result<(), MutationError> {
        let matcher = self.matcher();
        if matcher.group_pattern().trim().is_empty()
            || matcher.artifact_pattern().trim().is_empty()
        {
            return Err(MutationError::InvalidPattern(matcher.to_string()));
        }

        match self {
            Mutation::Rename {
                new_group,
                new_artifact,
                ..
            } => {
                let unchanged = match matcher.as_literal() {
                    Some(literal) => rename(&literal, new_group, new_artifact) == literal,
                    None => new_group.is_none() && new_artifact.is_none(),
                };
                if unchanged {
                    return Err(MutationError::NoOpMutation {
                        matcher: matcher.to_string(),
                        target: format!(
                            "{}:{}",
                            new_group.as_deref().unwrap_or(matcher.group_pattern()),
                            new_artifact.as_deref().unwrap_or(matcher.artifact_pattern())
                        ),
                    });
                }
                Ok(())
            }
            Mutation::Reversion { new_version, .. } if new_version.trim().is_empty() => {
                Err(MutationError::EmptyVersion(matcher.to_string()))
            }
            Mutation::Reversion { .. } | Mutation::Remove { .. } => Ok(()),
        }
    }
}

impl Display for Mutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mutation::Rename {
                matcher,
                new_group,
                new_artifact,
            } => write!(
                f,
                "rename {} to {}:{}",
                matcher,
                new_group.as_deref().unwrap_or("*"),
                new_artifact.as_deref().unwrap_or("*")
            ),
            Mutation::Reversion {
                matcher,
                new_version,
            } => write!(f, "set version of {matcher} to {new_version}"),
            Mutation::Remove { matcher } => write!(f, "remove {matcher}"),
        }
    }
}

fn rename(
    group_artifact: &GroupArtifact,
    new_group: &Option<String>,
    new_artifact: &Option<String>,
) -> GroupArtifact {
    GroupArtifact::new(
        new_group
            .clone()
            .unwrap_or_else(|| group_artifact.group.clone()),
        new_artifact
            .clone()
            .unwrap_or_else(|| group_artifact.artifact.clone()),
    )
}

/// The new project plus the names of the configurations that were replaced.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    pub project: GradleProject,
    pub changed_configurations: Vec<String>,
}

impl MutationOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.changed_configurations.is_empty()
    }
}

/// Applies one validated [`Mutation`] to project snapshots.
#[derive(Debug, Clone)]
pub struct MutationEngine {
    mutation: Mutation,
}

impl MutationEngine {
    /// Rejects mutations that cannot change anything before any traversal.
    pub fn new(mutation: Mutation) -> Result<Self, MutationError> {
        mutation.validate()?;
        Ok(MutationEngine { mutation })
    }

    pub fn mutation(&self) -> &Mutation {
        &self.mutation
    }

    /// Rewrites every configuration mentioning a matching coordinate. Untouched
    /// configurations are carried over as the same `Arc`.
    pub fn apply(&self, project: &GradleProject) -> MutationOutcome {
        let mut rewriter = Rewriter::new(&self.mutation);

        let mut changed_configurations = Vec::new();
        let mut name_to_configuration = project.name_to_configuration.clone();
        for (name, configuration) in name_to_configuration.iter_mut() {
            if let Some(updated) = rewriter.configuration(configuration) {
                trace!("Replacing configuration {} of {}", name, project.path);
                *configuration = Arc::new(updated);
                changed_configurations.push(name.clone());
            }
        }

        if changed_configurations.is_empty() {
            debug!("{} matched nothing in {}", self.mutation, project.path);
            return MutationOutcome {
                project: project.clone(),
                changed_configurations,
            };
        }

        debug!(
            "{} changed {} configurations of {}",
            self.mutation,
            changed_configurations.len(),
            project.path
        );
        MutationOutcome {
            project: project.with_name_to_configuration(name_to_configuration),
            changed_configurations,
        }
    }
}

/// Per-invocation state. Resolved nodes are shared between many
/// configurations, often as equal but separately allocated copies, so every
/// structurally distinct node is rewritten once and its replacement instance
/// is handed out for all of its copies.
///
/// A node's identity is its own coordinate plus the identities of its
/// children, so interning it costs only the node itself and never walks the
/// subtree again.
struct Rewriter<'a> {
    mutation: &'a Mutation,
    by_address: HashMap<*const ResolvedDependency, usize>,
    by_structure: HashMap<NodeKey, usize>,
    rewrites: Vec<Rewrite>,
}

#[derive(PartialEq, Eq, Hash)]
struct NodeKey {
    gav: ResolvedGroupArtifactVersion,
    classifier: Option<String>,
    extension: Option<String>,
    depth: u32,
    children: Vec<usize>,
}

#[derive(Clone)]
enum Rewrite {
    Unchanged,
    Replaced(Arc<ResolvedDependency>),
    Removed,
}

impl<'a> Rewriter<'a> {
    fn new(mutation: &'a Mutation) -> Self {
        Rewriter {
            mutation,
            by_address: HashMap::new(),
            by_structure: HashMap::new(),
            rewrites: Vec::new(),
        }
    }

    /// `None` when nothing in the configuration matched.
    fn configuration(
        &mut self,
        configuration: &GradleDependencyConfiguration,
    ) -> Option<GradleDependencyConfiguration> {
        let mut changed = false;

        let mut requested = Vec::with_capacity(configuration.requested.len());
        for dependency in &configuration.requested {
            match self.requested(dependency) {
                Edit::Keep => requested.push(dependency.clone()),
                Edit::Replace(replacement) => {
                    changed = true;
                    requested.push(replacement);
                }
                Edit::Drop => changed = true,
            }
        }

        let mut direct_resolved = Vec::with_capacity(configuration.direct_resolved.len());
        for dependency in &configuration.direct_resolved {
            match self.resolved(dependency) {
                Rewrite::Unchanged => direct_resolved.push(dependency.clone()),
                Rewrite::Replaced(replacement) => {
                    changed = true;
                    direct_resolved.push(replacement);
                }
                Rewrite::Removed => changed = true,
            }
        }

        changed.then(|| GradleDependencyConfiguration {
            requested,
            direct_resolved,
            ..configuration.clone()
        })
    }

    fn requested(&self, dependency: &RequestedDependency) -> Edit<RequestedDependency> {
        if !self.mutation.matcher().matches(dependency.group_artifact()) {
            return Edit::Keep;
        }
        match self.mutation {
            Mutation::Rename {
                new_group,
                new_artifact,
                ..
            } => {
                let renamed = rename(dependency.group_artifact(), new_group, new_artifact);
                if &renamed == dependency.group_artifact() {
                    Edit::Keep
                } else {
                    Edit::Replace(dependency.with_gav(dependency.gav.with_group_artifact(renamed)))
                }
            }
            Mutation::Reversion { new_version, .. } => match dependency.version() {
                // version-less declarations take their version from a platform
                None => Edit::Keep,
                Some(version) if version == new_version.as_str() => Edit::Keep,
                Some(_) => Edit::Replace(
                    dependency.with_gav(dependency.gav.with_version(Some(new_version.clone()))),
                ),
            },
            Mutation::Remove { .. } => Edit::Drop,
        }
    }

    fn resolved(&mut self, dependency: &Arc<ResolvedDependency>) -> Rewrite {
        let id = self.intern(dependency);
        self.rewrites[id].clone()
    }

    /// Identity of `dependency`, rewriting it the first time its structure is
    /// seen.
    fn intern(&mut self, dependency: &Arc<ResolvedDependency>) -> usize {
        // addresses are only compared; the project keeps every node alive
        let address = Arc::as_ptr(dependency);
        if let Some(&id) = self.by_address.get(&address) {
            return id;
        }

        let children: Vec<usize> = dependency
            .dependencies
            .iter()
            .map(|child| self.intern(child))
            .collect();
        let key = NodeKey {
            gav: dependency.gav.clone(),
            classifier: dependency.classifier.clone(),
            extension: dependency.extension.clone(),
            depth: dependency.depth,
            children,
        };

        let id = match self.by_structure.get(&key) {
            Some(&id) => id,
            None => {
                let rewrite = self.rewrite(dependency, &key.children);
                let id = self.rewrites.len();
                self.rewrites.push(rewrite);
                self.by_structure.insert(key, id);
                id
            }
        };
        self.by_address.insert(address, id);
        id
    }

    fn rewrite(&self, dependency: &ResolvedDependency, children: &[usize]) -> Rewrite {
        let matched = self.mutation.matcher().matches(dependency.group_artifact());
        if matched && matches!(self.mutation, Mutation::Remove { .. }) {
            return Rewrite::Removed;
        }

        let gav = if matched {
            self.resolved_gav(&dependency.gav)
        } else {
            None
        };
        let children = self.children(dependency, children);
        match (gav, children) {
            (None, None) => Rewrite::Unchanged,
            (gav, children) => Rewrite::Replaced(Arc::new(ResolvedDependency {
                gav: gav.unwrap_or_else(|| dependency.gav.clone()),
                dependencies: children.unwrap_or_else(|| dependency.dependencies.clone()),
                ..dependency.clone()
            })),
        }
    }

    /// Transitive children are rewritten for renames and reversions only; a
    /// library removed from the build script may still arrive through another.
    fn children(
        &self,
        dependency: &ResolvedDependency,
        children: &[usize],
    ) -> Option<Vec<Arc<ResolvedDependency>>> {
        if matches!(self.mutation, Mutation::Remove { .. }) {
            return None;
        }
        let mut changed = false;
        let rewritten: Vec<Arc<ResolvedDependency>> = dependency
            .dependencies
            .iter()
            .zip(children)
            .map(|(child, &id)| match &self.rewrites[id] {
                Rewrite::Replaced(replacement) => {
                    changed = true;
                    replacement.clone()
                }
                Rewrite::Unchanged | Rewrite::Removed => child.clone(),
            })
            .collect();
        changed.then_some(rewritten)
    }

    fn resolved_gav(
        &self,
        gav: &ResolvedGroupArtifactVersion,
    ) -> Option<ResolvedGroupArtifactVersion> {
        match self.mutation {
            Mutation::Rename {
                new_group,
                new_artifact,
                ..
            } => {
                let renamed = rename(&gav.group_artifact, new_group, new_artifact);
                (renamed != gav.group_artifact).then(|| gav.with_group_artifact(renamed))
            }
            Mutation::Reversion { new_version, .. } => {
                (&gav.version != new_version).then(|| gav.with_version(new_version.clone()))
            }
            Mutation::Remove { .. } => None,
        }
    }
}

enum Edit<T> {
    Keep,
    Replace(T),
    Drop,
}
