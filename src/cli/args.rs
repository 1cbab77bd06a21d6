use clap::Parser;

/// Version selection and dependency graph edits over Gradle project snapshots.
#[derive(Debug, Parser)]
#[clap(version)]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Command,
    /// TOML snapshot of the project to read
    #[clap(short, long, default_value = "project.toml")]
    pub project: String,
    /// Where to write the edited snapshot; defaults to overwriting `--project`
    #[clap(short, long)]
    pub output: Option<String>,
    /// Repository used when the project declares none
    #[clap(long, env = "GRADLE_DEPMODEL_REPOSITORY_URL")]
    pub repository_url: Option<String>,
    /// Metadata request timeout in seconds
    #[clap(long)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Parser)]
pub enum Command {
    ///Selects a version for a new dependency or an upgrade of an existing one
    Select {
        /// `group:artifact`, or `group:artifact:version` to upgrade from that version
        dependency: String,
        #[clap(short, long, default_value = "implementation")]
        configuration: String,
        /// `latest.release`, `latest.patch`, a range or an exact version
        #[clap(short, long, default_value = "latest.release")]
        selector: String,
        /// Substring a candidate must contain, such as `-jre`
        #[clap(long)]
        pattern: Option<String>,
    },
    ///Renames matching dependencies in every configuration
    Rename {
        /// `group:artifact`, either side may be a glob
        dependency: String,
        #[clap(long)]
        group: Option<String>,
        #[clap(long)]
        artifact: Option<String>,
    },
    ///Sets the version of matching dependencies in every configuration
    SetVersion {
        dependency: String,
        version: String,
    },
    ///Removes matching dependencies declared in any configuration
    Remove { dependency: String },
    ///Lists configurations that inherit from a configuration
    Dependents {
        configuration: String,
        #[clap(long)]
        include_self: bool,
    },
}
