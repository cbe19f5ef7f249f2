use std::path::PathBuf;

mod export;
mod file;
mod init;
mod project;
mod terminal;

use anyhow::Context;
use clap::ArgAction;
use pylabs::{Config, DirectoryStore, ProjectService, ProjectStore};
use terminal::Colorize;

type Service = ProjectService<DirectoryStore>;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory projects are stored in
    #[arg(short, long, default_value = ".pylabs", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        match self.command.unwrap_or(Command::Projects) {
            Command::Init(command) => command.run(&self.root).await,
            command => {
                let config = Config::load_or_default(&self.root);
                let mut service = ProjectService::new(DirectoryStore::new(self.root), config);
                command.run(&mut service).await
            }
        }
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Create the store directory and its configuration file
    Init(init::Init),

    /// List projects (default)
    Projects,

    /// Create a new project
    New(project::New),

    /// Delete a project and all of its files
    Rm(project::Remove),

    /// List the files of a project
    Files(file::List),

    /// Print the editable content of a file
    ///
    /// For a library this is its `__init__.py`.
    Show(file::Show),

    /// Create an empty file
    Touch(file::Touch),

    /// Create a library
    ///
    /// Libraries are folders of files stored under a single `__name__`
    /// entry.
    Lib(file::Lib),

    /// Replace the content of a file
    Save(file::Save),

    /// Delete a file
    Del(file::Delete),

    /// Export a project as an archive
    Export(export::Export),
}

impl Command {
    async fn run(self, service: &mut Service) -> anyhow::Result<()> {
        match self {
            Self::Init(command) => command.run(service.store().root()).await?,
            Self::Projects => list_projects(service).await?,
            Self::New(command) => command.run(service).await?,
            Self::Rm(command) => command.run(service).await?,
            Self::Files(command) => command.run(service).await?,
            Self::Show(command) => command.run(service).await?,
            Self::Touch(command) => command.run(service).await?,
            Self::Lib(command) => command.run(service).await?,
            Self::Save(command) => command.run(service).await?,
            Self::Del(command) => command.run(service).await?,
            Self::Export(command) => command.run(service).await?,
        }
        Ok(())
    }
}

async fn list_projects(service: &Service) -> anyhow::Result<()> {
    let projects = service.list_projects().await?;
    if projects.is_empty() {
        println!("{}", "No projects yet. Create one with 'pylabs new <name>'".dim());
    }
    for name in projects {
        println!("{name}");
    }
    Ok(())
}

/// Selects an existing project, failing if it has never been stored.
///
/// The service would otherwise open an unknown name as a new, empty project.
async fn open_project(service: &mut Service, name: &str) -> anyhow::Result<()> {
    let name = name.trim();
    if service.store().get(name).await?.is_none() {
        anyhow::bail!("Project '{name}' does not exist");
    }
    service.select_project(name).await?;
    Ok(())
}

/// Asks the user to agree to a destructive operation. Defaults to no.
fn confirm(prompt: &str) -> anyhow::Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}
