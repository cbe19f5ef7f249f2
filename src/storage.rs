use std::{future::Future, io, path::PathBuf};

use crate::domain::{Files, Project};

pub mod directory;
mod memory;
mod record;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;

/// Durable CRUD over project records, keyed by project name.
///
/// Operations are asynchronous since a backend may sit on disk or across a
/// network. The store performs no validation: naming rules belong to the
/// [`ProjectService`](crate::ProjectService), which is its only writer.
pub trait ProjectStore {
    /// Persists the project, replacing any existing record with that name.
    fn put(&self, name: &str, files: &Files) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Fetches a project. Absence is `Ok(None)`, not an error.
    fn get(&self, name: &str) -> impl Future<Output = Result<Option<Project>, StoreError>> + Send;

    /// Removes a project. Removing an absent project succeeds.
    fn delete(&self, name: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Returns every stored project, in no particular order.
    fn list(&self) -> impl Future<Output = Result<Vec<Project>, StoreError>> + Send;
}

/// Failure of the storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be read or written.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// The location being accessed.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// A stored record could not be understood.
    #[error("corrupt project record at {}: {source}", path.display())]
    Corrupt {
        /// The location of the record.
        path: PathBuf,
        /// The parse failure.
        source: serde_json::Error,
    },
}
