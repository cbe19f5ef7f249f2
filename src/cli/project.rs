use tracing::instrument;

use super::{Service, confirm};
use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct New {
    /// The name of the project. Surrounding whitespace is ignored.
    name: String,
}

impl New {
    #[instrument(skip(service))]
    pub async fn run(self, service: &mut Service) -> anyhow::Result<()> {
        service.create_project(&self.name).await?;
        let name = service.current_project().unwrap_or(self.name.as_str());
        println!("{}", format!("Created project {name}").success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Remove {
    /// The project to delete
    name: String,

    /// Delete without asking for confirmation
    #[arg(long, short)]
    yes: bool,
}

impl Remove {
    #[instrument(skip(service))]
    pub async fn run(self, service: &mut Service) -> anyhow::Result<()> {
        use pylabs::ProjectStore;

        let Some(project) = service.store().get(&self.name).await? else {
            anyhow::bail!("Project '{}' does not exist", self.name);
        };

        let pending = service.request_delete_project(project.name());
        if !self.yes && !confirm(&pending.prompt())? {
            println!("{}", "Cancelled".dim());
            return Ok(());
        }

        service.delete_project(pending.confirm()).await?;
        println!(
            "{}",
            format!(
                "Deleted project {} ({} files)",
                self.name,
                project.files().len()
            )
            .success()
        );
        Ok(())
    }
}
