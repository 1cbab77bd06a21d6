use log::info;

use crate::{
    api::DependencyModel,
    matcher::DependencyMatcher,
    metadata::MetadataGateway,
    model::{GradleProject, GroupArtifactVersion},
    mutation::{Mutation, MutationEngine, MutationOutcome},
};
use std::{error::Error, path::Path};

/// Handler to select command
/// Upgrades from the given or declared version when there is one, otherwise
/// picks a version for a new dependency
pub fn do_select<G>(
    model: &DependencyModel<G>,
    project_path: &Path,
    dependency: &str,
    configuration: &str,
    selector: &str,
    pattern: Option<&str>,
) -> Result<String, Box<dyn Error>>
where
    G: MetadataGateway,
{
    let project = GradleProject::from_file(project_path)?;
    let requested = parse_coordinate(dependency)?;

    let current = match requested.version {
        Some(_) => Some(requested.clone()),
        None => project
            .configuration(configuration)
            .and_then(|c| c.find_requested_dependency(requested.group(), requested.artifact()))
            .filter(|d| d.version().is_some())
            .map(|d| d.gav.clone()),
    };

    let message = match current {
        Some(current) => model
            .upgrade_outcome(&project, &current, configuration, selector, pattern)?
            .to_string(),
        None => match model.select_new_version(
            &project,
            &requested.group_artifact,
            configuration,
            selector,
            pattern,
        )? {
            Some(version) => format!("{}:{}", requested.group_artifact, version),
            None => format!(
                "no version of {} matches {}",
                requested.group_artifact, selector
            ),
        },
    };

    Ok(message)
}

/// Handler to rename command
pub fn do_rename(
    project_path: &Path,
    output_path: Option<&Path>,
    dependency: &str,
    new_group: Option<String>,
    new_artifact: Option<String>,
) -> Result<MutationOutcome, Box<dyn Error>> {
    let mutation = Mutation::Rename {
        matcher: parse_matcher(dependency)?,
        new_group,
        new_artifact,
    };
    apply_and_write(project_path, output_path, mutation)
}

/// Handler to set-version command
pub fn do_set_version(
    project_path: &Path,
    output_path: Option<&Path>,
    dependency: &str,
    new_version: &str,
) -> Result<MutationOutcome, Box<dyn Error>> {
    let mutation = Mutation::Reversion {
        matcher: parse_matcher(dependency)?,
        new_version: new_version.to_owned(),
    };
    apply_and_write(project_path, output_path, mutation)
}

/// Handler to remove command
pub fn do_remove(
    project_path: &Path,
    output_path: Option<&Path>,
    dependency: &str,
) -> Result<MutationOutcome, Box<dyn Error>> {
    let mutation = Mutation::Remove {
        matcher: parse_matcher(dependency)?,
    };
    apply_and_write(project_path, output_path, mutation)
}

/// Handler to dependents command
pub fn do_dependents(
    project_path: &Path,
    configuration: &str,
    include_self: bool,
) -> Result<Vec<String>, Box<dyn Error>> {
    let project = GradleProject::from_file(project_path)?;
    if project.configuration(configuration).is_none() {
        return Err(format!(
            "Configuration {} does not exist in {}",
            configuration, project.path
        )
        .into());
    }
    Ok(project
        .configurations_extending_from(configuration, include_self)
        .iter()
        .map(|c| c.name.clone())
        .collect())
}

fn apply_and_write(
    project_path: &Path,
    output_path: Option<&Path>,
    mutation: Mutation,
) -> Result<MutationOutcome, Box<dyn Error>> {
    let engine = MutationEngine::new(mutation)?;
    let project = GradleProject::from_file(project_path)?;
    let outcome = engine.apply(&project);

    if outcome.is_unchanged() && output_path.is_none() {
        info!(
            "Nothing matched {}, {} is left as is",
            engine.mutation().matcher(),
            project_path.display()
        );
        return Ok(outcome);
    }

    let output_path = output_path.unwrap_or(project_path);
    std::fs::write(output_path, outcome.project.to_toml_string()?)?;
    info!(
        "Wrote project snapshot to {} ({} configurations changed)",
        output_path.display(),
        outcome.changed_configurations.len()
    );
    Ok(outcome)
}

fn parse_coordinate(coordinate: &str) -> Result<GroupArtifactVersion, Box<dyn Error>> {
    let parts: Vec<&str> = coordinate.split(':').collect();
    match parts.as_slice() {
        [group, artifact] if !group.is_empty() && !artifact.is_empty() => {
            Ok(GroupArtifactVersion::new(*group, *artifact, None))
        }
        [group, artifact, version]
            if !group.is_empty() && !artifact.is_empty() && !version.is_empty() =>
        {
            Ok(GroupArtifactVersion::new(
                *group,
                *artifact,
                Some(version.to_string()),
            ))
        }
        _ => Err(format!("Expected group:artifact[:version], got `{coordinate}`").into()),
    }
}

fn parse_matcher(dependency: &str) -> Result<DependencyMatcher, Box<dyn Error>> {
    match dependency.split_once(':') {
        Some((group, artifact)) if !artifact.contains(':') => {
            Ok(DependencyMatcher::new(group, artifact))
        }
        _ => Err(format!("Expected group:artifact, got `{dependency}`").into()),
    }
}
