use std::{error::Error, path::Path, time::Duration};

use clap::Parser;
use gradle_depmodel::{
    cli::{
        args::{CliArgs, Command},
        command_handlers,
    },
    model::MavenRepository,
    DependencyModel,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = CliArgs::parse();

    let project = Path::new(&cli_args.project);
    let output = cli_args.output.as_deref().map(Path::new);

    match cli_args.cmd {
        Command::Select {
            dependency,
            configuration,
            selector,
            pattern,
        } => {
            let mut builder = DependencyModel::builder();
            if let Some(url) = cli_args.repository_url {
                builder = builder.default_repositories(vec![MavenRepository::new("default", url)]);
            }
            if let Some(timeout) = cli_args.timeout {
                builder = builder.metadata_timeout(Duration::from_secs(timeout));
            }
            let model = builder.try_build()?;

            let message = command_handlers::do_select(
                &model,
                project,
                &dependency,
                &configuration,
                &selector,
                pattern.as_deref(),
            )?;
            println!("{message}");
        }
        Command::Rename {
            dependency,
            group,
            artifact,
        } => {
            command_handlers::do_rename(project, output, &dependency, group, artifact)?;
        }
        Command::SetVersion {
            dependency,
            version,
        } => {
            command_handlers::do_set_version(project, output, &dependency, &version)?;
        }
        Command::Remove { dependency } => {
            command_handlers::do_remove(project, output, &dependency)?;
        }
        Command::Dependents {
            configuration,
            include_self,
        } => {
            for name in command_handlers::do_dependents(project, &configuration, include_self)? {
                println!("{name}");
            }
        }
    }

    Ok(())
}
