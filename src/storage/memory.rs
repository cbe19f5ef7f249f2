use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{
    domain::{Files, Project},
    storage::{ProjectStore, StoreError},
};

/// A store that keeps projects in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: RwLock<HashMap<String, Files>>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectStore for MemoryStore {
    async fn put(&self, name: &str, files: &Files) -> Result<(), StoreError> {
        self.projects
            .write()
            .await
            .insert(name.to_string(), files.clone());
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Option<Project>, StoreError> {
        Ok(self
            .projects
            .read()
            .await
            .get(name)
            .map(|files| Project::new(name, files.clone())))
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        self.projects.write().await.remove(name);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self
            .projects
            .read()
            .await
            .iter()
            .map(|(name, files)| Project::new(name.clone(), files.clone()))
            .collect())
    }
}
