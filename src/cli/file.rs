use std::path::PathBuf;

use anyhow::Context;
use pylabs::{EntryKind, FileEntry};
use tokio::io::AsyncReadExt;
use tracing::instrument;

use super::{Service, confirm, open_project};
use crate::cli::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct List {
    /// The project whose files to list
    project: String,
}

impl List {
    #[instrument(skip(service))]
    pub async fn run(self, service: &mut Service) -> anyhow::Result<()> {
        open_project(service, &self.project).await?;

        let files = service.list_files()?;
        if files.is_empty() {
            println!("{}", "No files".dim());
        }
        for file in files {
            match file.kind {
                EntryKind::PlainFile => println!("{}", file.name),
                EntryKind::Library => println!("{} {}", file.name, "Lib".label()),
            }
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Show {
    /// The project holding the file
    project: String,

    /// The file to show
    file: String,

    /// For a library, print every sub-file rather than only `__init__.py`
    #[arg(long)]
    all: bool,
}

impl Show {
    #[instrument(skip(service))]
    pub async fn run(self, service: &mut Service) -> anyhow::Result<()> {
        open_project(service, &self.project).await?;

        if self.all {
            if let FileEntry::Library(files) = service.entry(&self.file)? {
                for (name, content) in files {
                    println!("{}", format!("# {}/{name}", self.file).dim());
                    println!("{content}");
                }
                return Ok(());
            }
        }

        let view = service.select_file(&self.file)?;
        println!("{}", format!("# {}", view.label).dim());
        println!("{}", view.content);
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Touch {
    /// The project to add the file to
    project: String,

    /// The file name, including its suffix (e.g. 'main.py')
    file: String,
}

impl Touch {
    #[instrument(skip(service))]
    pub async fn run(self, service: &mut Service) -> anyhow::Result<()> {
        open_project(service, &self.project).await?;
        let name = service.create_file(&self.file).await?;
        println!("{}", format!("Created {name}").success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Lib {
    /// The project to add the library to
    project: String,

    /// The library name: letters, digits and underscores only
    identifier: String,
}

impl Lib {
    #[instrument(skip(service))]
    pub async fn run(self, service: &mut Service) -> anyhow::Result<()> {
        open_project(service, &self.project).await?;
        let name = service.create_library(&self.identifier).await?;
        println!("{}", format!("Created library {name}").success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Save {
    /// The project holding the file
    project: String,

    /// The file to overwrite
    ///
    /// For a library, the new content must be a JSON object mapping sub-file
    /// names to their contents.
    file: String,

    /// Read the new content from this path instead of stdin
    #[arg(long)]
    from: Option<PathBuf>,
}

impl Save {
    #[instrument(skip(service))]
    pub async fn run(self, service: &mut Service) -> anyhow::Result<()> {
        let content = match &self.from {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
            None => {
                let mut content = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut content)
                    .await
                    .context("Failed to read stdin")?;
                content
            }
        };

        open_project(service, &self.project).await?;
        service.select_file(&self.file)?;
        service.save_file(&content).await?;

        println!("{}", format!("Saved {}", self.file).success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Delete {
    /// The project holding the file
    project: String,

    /// The file to delete
    file: String,

    /// Delete without asking for confirmation
    #[arg(long, short)]
    yes: bool,
}

impl Delete {
    #[instrument(skip(service))]
    pub async fn run(self, service: &mut Service) -> anyhow::Result<()> {
        open_project(service, &self.project).await?;

        let pending = service.request_delete_file(&self.file)?;
        if !self.yes && !confirm(&pending.prompt())? {
            println!("{}", "Cancelled".dim());
            return Ok(());
        }

        service.delete_file(pending.confirm()).await?;
        println!("{}", format!("Deleted {}", self.file).success());
        Ok(())
    }
}
