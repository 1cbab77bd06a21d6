use std::{cmp::Ordering, collections::HashMap, fmt::Display, str::FromStr};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    matcher::DependencyMatcher,
    model::{GradleDependencyConfiguration, GroupArtifact, RequestedDependency},
    mutation::Mutation,
    version::Version,
};

/// When an explicit version next to a platform-managed one counts as
/// redundant, judged as `declared <op> managed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagedVersionComparison {
    /// Any explicit version is redundant once a managed one exists.
    Any,
    /// On a tie the managed version is authoritative.
    #[default]
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl ManagedVersionComparison {
    pub fn is_redundant(self, declared: &str, managed: &str) -> bool {
        let ordering = match (Version::parse(declared), Version::parse(managed)) {
            (Some(declared), Some(managed)) => declared.cmp(&managed),
            // unparseable versions only ever tie with themselves
            _ if declared == managed => Ordering::Equal,
            _ => return self == ManagedVersionComparison::Any,
        };
        match self {
            ManagedVersionComparison::Any => true,
            ManagedVersionComparison::Eq => ordering == Ordering::Equal,
            ManagedVersionComparison::Lt => ordering == Ordering::Less,
            ManagedVersionComparison::Lte => ordering != Ordering::Greater,
            ManagedVersionComparison::Gt => ordering == Ordering::Greater,
            ManagedVersionComparison::Gte => ordering != Ordering::Less,
        }
    }
}

impl Display for ManagedVersionComparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ManagedVersionComparison::Any => "any",
            ManagedVersionComparison::Eq => "eq",
            ManagedVersionComparison::Lt => "lt",
            ManagedVersionComparison::Lte => "lte",
            ManagedVersionComparison::Gt => "gt",
            ManagedVersionComparison::Gte => "gte",
        };
        f.write_str(name)
    }
}

impl FromStr for ManagedVersionComparison {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "any" => Ok(ManagedVersionComparison::Any),
            "eq" => Ok(ManagedVersionComparison::Eq),
            "lt" => Ok(ManagedVersionComparison::Lt),
            "lte" => Ok(ManagedVersionComparison::Lte),
            "gt" => Ok(ManagedVersionComparison::Gt),
            "gte" => Ok(ManagedVersionComparison::Gte),
            other => Err(format!(
                "unknown comparison `{other}`, expected one of any, eq, lt, lte, gt, gte"
            )),
        }
    }
}

/// Requested dependencies of `configuration` whose explicit version adds
/// nothing over the version a platform manages for the same coordinate.
pub fn redundant_dependencies<'c>(
    configuration: &'c GradleDependencyConfiguration,
    managed_versions: &HashMap<GroupArtifact, String>,
    comparison: ManagedVersionComparison,
) -> Vec<&'c RequestedDependency> {
    configuration
        .requested
        .iter()
        .filter(|dependency| {
            let (Some(declared), Some(managed)) = (
                dependency.version(),
                managed_versions.get(dependency.group_artifact()),
            ) else {
                return false;
            };
            let redundant = comparison.is_redundant(declared, managed);
            if redundant {
                debug!(
                    "{} in {} is redundant with managed version {}",
                    dependency, configuration.name, managed
                );
            }
            redundant
        })
        .collect()
}

/// One `Remove` per distinct coordinate, in first-seen order.
pub fn removal_mutations<'d, I>(dependencies: I) -> Vec<Mutation>
where
    I: IntoIterator<Item = &'d RequestedDependency>,
{
    let mut seen: Vec<&GroupArtifact> = Vec::new();
    let mut mutations = Vec::new();
    for dependency in dependencies {
        if seen.contains(&dependency.group_artifact()) {
            continue;
        }
        seen.push(dependency.group_artifact());
        mutations.push(Mutation::Remove {
            matcher: DependencyMatcher::from(dependency.group_artifact()),
        });
    }
    mutations
}
