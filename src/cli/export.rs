use std::path::PathBuf;

use anyhow::Context;
use tracing::instrument;

use super::{Service, open_project};
use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Export {
    /// The project to export
    project: String,

    /// The directory to write the archive to
    #[arg(long, short, default_value = ".")]
    out: PathBuf,
}

impl Export {
    #[instrument(skip(service))]
    pub async fn run(self, service: &mut Service) -> anyhow::Result<()> {
        open_project(service, &self.project).await?;

        let payload = service.export_project()?;
        let path = self
            .out
            .join(payload.file_name(service.config().archive_extension()));

        tokio::fs::create_dir_all(&self.out)
            .await
            .with_context(|| format!("Failed to create {}", self.out.display()))?;
        tokio::fs::write(&path, payload.bytes())
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        println!("{}", format!("Exported to {}", path.display()).success());
        Ok(())
    }
}
