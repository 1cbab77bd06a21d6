mod configuration;
mod coordinate;
mod dependency;
mod project;
mod repository;

use thiserror::Error;

pub use configuration::GradleDependencyConfiguration;
pub use coordinate::{GroupArtifact, GroupArtifactVersion, ResolvedGroupArtifactVersion};
pub use dependency::{RequestedDependency, ResolvedDependency};
pub use project::{is_plugin_classpath, GradleProject, PLUGIN_CLASSPATH_CONFIGURATION};
pub use repository::{Credentials, MavenRepository, MAVEN_CENTRAL_URL};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading project snapshot: {0}")]
    IO(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Configuration `{0}` is declared more than once")]
    DuplicateConfiguration(String),
    #[error("Configuration `{referenced_by}` extends from unknown configuration `{name}`")]
    UnknownConfiguration { name: String, referenced_by: String },
}
