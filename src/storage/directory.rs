//! A filesystem backed store of projects
//!
//! Each project is kept as one JSON record inside the store directory. The
//! record's file name is the SHA-256 digest of the project name, so any name
//! can be stored regardless of the characters it contains.

use std::{
    io,
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::instrument;

use crate::{
    domain::{Files, Project},
    storage::{record::Record, ProjectStore, StoreError},
};

const RECORD_EXTENSION: &str = "json";

/// A filesystem backed store of projects.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    /// The directory records are stored in.
    root: PathBuf,
}

impl DirectoryStore {
    /// Opens a store at the given directory.
    ///
    /// The directory is created on the first write if it does not exist.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory records are stored in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a path names a project record: a SHA-256 hex digest with the
    /// record extension.
    fn is_record_path(path: &Path) -> bool {
        path.extension().and_then(|ext| ext.to_str()) == Some(RECORD_EXTENSION)
            && path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .is_some_and(|stem| {
                    stem.len() == 64 && stem.chars().all(|c| c.is_ascii_hexdigit())
                })
    }

    fn record_path(&self, name: &str) -> PathBuf {
        let hash = Sha256::digest(name.as_bytes());
        self.root.join(format!("{hash:x}.{RECORD_EXTENSION}"))
    }

    async fn read_record(path: &Path) -> Result<Option<Project>, StoreError> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let record: Record =
            serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Some(record.into()))
    }
}

impl ProjectStore for DirectoryStore {
    /// Writes the record to a temporary file and renames it into place, so a
    /// failed write never truncates the previous record.
    #[instrument(skip(self, files), fields(count = files.len()))]
    async fn put(&self, name: &str, files: &Files) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(io_error(&self.root))?;

        let path = self.record_path(name);
        let tmp = path.with_extension("tmp");
        let payload = serde_json::to_vec_pretty(&Record::new(name, files))
            .map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?;

        fs::write(&tmp, payload).await.map_err(io_error(&tmp))?;
        fs::rename(&tmp, &path).await.map_err(io_error(&path))?;

        tracing::debug!("Stored project '{name}' at {}", path.display());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, name: &str) -> Result<Option<Project>, StoreError> {
        Self::read_record(&self.record_path(name)).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.record_path(name);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Project '{name}' was already absent");
                Ok(())
            }
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Files not named like a record are ignored. Records that cannot be
    /// parsed are skipped with a warning, so that one damaged file does not
    /// hide every other project.
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Project>, StoreError> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.root.clone(),
                    source,
                });
            }
        };

        let mut projects = Vec::new();
        loop {
            let entry = entries
                .next_entry()
                .await
                .map_err(|source| StoreError::Io {
                    path: self.root.clone(),
                    source,
                })?;
            let Some(entry) = entry else { break };

            let path = entry.path();
            if !Self::is_record_path(&path) {
                continue;
            }

            match Self::read_record(&path).await {
                Ok(Some(project)) => projects.push(project),
                Ok(None) => {}
                Err(e) => tracing::warn!("Skipping unreadable project record: {e}"),
            }
        }

        Ok(projects)
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn setup_temp_store() -> (TempDir, DirectoryStore) {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let store = DirectoryStore::new(tmp.path().join("projects"));
        (tmp, store)
    }

    fn files(pairs: &[(&str, &str)]) -> Files {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[tokio::test]
    async fn put_then_get() {
        let (_tmp, store) = setup_temp_store();
        let files = files(&[("main.py", "print(1)"), ("__lib__", "{}")]);

        store.put("demo", &files).await.unwrap();

        let loaded = store.get("demo").await.unwrap().unwrap();
        assert_eq!(loaded, Project::new("demo", files));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let (_tmp, store) = setup_temp_store();
        assert!(store.get("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn names_with_path_characters_are_stored() {
        let (_tmp, store) = setup_temp_store();
        let name = "../odd/name: with * chars";

        store.put(name, &Files::new()).await.unwrap();

        assert_eq!(store.get(name).await.unwrap().unwrap().name(), name);
    }

    #[tokio::test]
    async fn put_overwrites_and_leaves_no_temporary_files() {
        let (_tmp, store) = setup_temp_store();
        store.put("demo", &files(&[("a.py", "1")])).await.unwrap();
        store.put("demo", &files(&[("a.py", "2")])).await.unwrap();

        let loaded = store.get("demo").await.unwrap().unwrap();
        assert_eq!(loaded.files()["a.py"], "2");

        let names: Vec<_> = std::fs::read_dir(store.root())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_tmp, store) = setup_temp_store();
        store.put("demo", &Files::new()).await.unwrap();

        store.delete("demo").await.unwrap();
        store.delete("demo").await.unwrap();

        assert!(store.get("demo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_on_missing_directory_is_empty() {
        let (_tmp, store) = setup_temp_store();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_skips_corrupt_records_and_foreign_files() {
        let (_tmp, store) = setup_temp_store();
        store.put("one", &Files::new()).await.unwrap();
        store.put("two", &Files::new()).await.unwrap();
        let corrupt = format!("{}.json", "0".repeat(64));
        std::fs::write(store.root().join(corrupt), "{ nope").unwrap();
        std::fs::write(store.root().join("package.json"), r#"{"name": "app"}"#).unwrap();
        std::fs::write(store.root().join("config.toml"), "_version = \"1\"").unwrap();

        let mut names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name().to_string())
            .collect();
        names.sort();

        assert_eq!(names, ["one", "two"]);
    }

    #[test]
    fn record_paths_are_recognised() {
        let store = DirectoryStore::new("projects");
        assert!(DirectoryStore::is_record_path(&store.record_path("demo")));
        assert!(!DirectoryStore::is_record_path(Path::new("package.json")));
        assert!(!DirectoryStore::is_record_path(
            &store.record_path("demo").with_extension("tmp")
        ));
    }

    #[tokio::test]
    async fn get_surfaces_corrupt_record() {
        let (_tmp, store) = setup_temp_store();
        store.put("demo", &Files::new()).await.unwrap();
        std::fs::write(store.record_path("demo"), "not json").unwrap();

        let error = store.get("demo").await.unwrap_err();
        assert!(matches!(error, StoreError::Corrupt { .. }));
    }
}
