//! Project and file operations for a single editing session
//!
//! The [`ProjectService`] is the only writer to a [`ProjectStore`]. It keeps
//! the selected project's files in memory and moves through three states:
//! no project selected, a project selected, and a file within it selected.
//!
//! Every mutation builds the new file mapping, persists it, and only then
//! replaces the in-memory copy. A failed store write therefore leaves the
//! session exactly as it was.
//!
//! Deleting is two-step. [`ProjectService::request_delete_project`] and
//! [`ProjectService::request_delete_file`] return a [`PendingDelete`]; the
//! caller asks the user, and only [`PendingDelete::confirm`] yields the
//! [`Confirmed`] token the delete methods accept.

use std::fmt;

use tracing::instrument;

use crate::{
    archive::{self, ArchivePayload, ExportError},
    domain::{
        is_library_name, is_visible, library_key, parse_library, validate_file_name, Config,
        EntryKind, FileEntry, Files, InvalidNameError, LibraryContentError, ProjectName,
        LIBRARY_ENTRY_POINT,
    },
    storage::{ProjectStore, StoreError},
};

/// Orchestrates a [`ProjectStore`] on behalf of one user session.
#[derive(Debug)]
pub struct ProjectService<S> {
    store: S,
    config: Config,
    session: Option<OpenProject>,
}

#[derive(Debug)]
struct OpenProject {
    name: String,
    files: Files,
    selected: Option<String>,
}

/// Where a session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing is open.
    NoProjectSelected,
    /// A project is open, with no file selected.
    ProjectSelected,
    /// A project is open and one of its files is selected for editing.
    FileSelected,
}

/// A visible entry of the selected project, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListing {
    /// The stored file name.
    pub name: String,
    /// Whether the name denotes a plain file or a library.
    pub kind: EntryKind,
}

/// The editable view of a selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileView {
    /// The stored file name.
    pub name: String,
    /// How the stored value was interpreted.
    pub kind: EntryKind,
    /// A heading for the editor, `<library>/__init__.py` for libraries.
    pub label: String,
    /// The text offered for editing.
    pub content: String,
}

impl FileView {
    fn new(name: &str, entry: &FileEntry) -> Self {
        let label = match entry {
            FileEntry::Library(_) => format!("{name}/{LIBRARY_ENTRY_POINT}"),
            FileEntry::PlainFile(_) => name.to_string(),
        };
        Self {
            name: name.to_string(),
            kind: entry.kind(),
            label,
            content: entry.editable_content().to_string(),
        }
    }
}

/// A project awaiting deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTarget {
    name: String,
}

impl ProjectTarget {
    /// The project to delete.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ProjectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "project \"{}\"", self.name)
    }
}

/// A file awaiting deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTarget {
    project: String,
    name: String,
}

impl FileTarget {
    /// The project holding the file.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// The file to delete.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for FileTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file \"{}\"", self.name)
    }
}

/// A destructive operation waiting on the user's decision.
///
/// Dropping it declines the operation.
#[derive(Debug)]
#[must_use = "a pending delete does nothing until confirmed"]
pub struct PendingDelete<T> {
    target: T,
}

impl<T> PendingDelete<T> {
    /// What would be deleted.
    pub const fn target(&self) -> &T {
        &self.target
    }

    /// Records the user's consent.
    pub fn confirm(self) -> Confirmed<T> {
        Confirmed {
            target: self.target,
        }
    }
}

impl<T: fmt::Display> PendingDelete<T> {
    /// A question suitable for a confirmation prompt.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!("Delete {}? This cannot be undone.", self.target)
    }
}

/// Proof that the user agreed to a deletion.
#[derive(Debug)]
pub struct Confirmed<T> {
    target: T,
}

/// The object an error refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// A project, by name.
    Project(String),
    /// A file of the selected project, by name.
    File(String),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project(name) => write!(f, "project '{name}'"),
            Self::File(name) => write!(f, "file '{name}'"),
        }
    }
}

/// Errors returned by [`ProjectService`] operations.
///
/// None of these leave the service unusable, and none leave partial state
/// behind.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The store failed. Nothing was changed.
    #[error(transparent)]
    Persistence(#[from] StoreError),
    /// The referenced object does not exist.
    #[error("{0} not found")]
    NotFound(Subject),
    /// Creation would overwrite an existing object.
    #[error("{0} already exists")]
    AlreadyExists(Subject),
    /// The supplied name breaks a naming rule.
    #[error(transparent)]
    InvalidName(#[from] InvalidNameError),
    /// Library content was not a JSON mapping of sub-files.
    #[error(transparent)]
    InvalidContent(#[from] LibraryContentError),
    /// The operation needs a selected project.
    #[error("no project selected")]
    NoProjectSelected,
    /// The operation needs a selected file.
    #[error("no file selected")]
    NoFileSelected,
    /// A confirmed file deletion was issued for a project that is no longer
    /// selected.
    #[error("confirmation was given for project '{0}', which is no longer selected")]
    StaleConfirmation(String),
    /// Building the archive failed.
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl<S: ProjectStore> ProjectService<S> {
    /// A service over `store` with nothing selected.
    pub const fn new(store: S, config: Config) -> Self {
        Self {
            store,
            config,
            session: None,
        }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The active configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Where the session currently stands.
    pub const fn state(&self) -> SessionState {
        match &self.session {
            None => SessionState::NoProjectSelected,
            Some(OpenProject { selected: None, .. }) => SessionState::ProjectSelected,
            Some(OpenProject {
                selected: Some(_), ..
            }) => SessionState::FileSelected,
        }
    }

    /// The selected project's name.
    pub fn current_project(&self) -> Option<&str> {
        self.session.as_ref().map(|open| open.name.as_str())
    }

    /// The selected file's name.
    pub fn current_file(&self) -> Option<&str> {
        self.session.as_ref()?.selected.as_deref()
    }

    /// The selected project's raw files, hidden entries included.
    pub fn files(&self) -> Option<&Files> {
        self.session.as_ref().map(|open| &open.files)
    }

    /// Names of all visible projects, sorted.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be listed.
    #[instrument(skip(self))]
    pub async fn list_projects(&self) -> Result<Vec<String>, ServiceError> {
        let mut names: Vec<_> = self
            .store
            .list()
            .await?
            .into_iter()
            .map(|project| project.into_parts().0)
            .filter(|name| is_visible(name))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Creates an empty project and selects it.
    ///
    /// # Errors
    ///
    /// Fails if the trimmed name is empty, a project with that name exists,
    /// or the store cannot be written.
    #[instrument(skip(self))]
    pub async fn create_project(&mut self, name: &str) -> Result<(), ServiceError> {
        let name = ProjectName::new(name)?;

        if self.store.get(&name).await?.is_some() {
            return Err(ServiceError::AlreadyExists(Subject::Project(
                name.to_string(),
            )));
        }

        let files = Files::new();
        self.store.put(&name, &files).await?;
        tracing::info!("Created project '{name}'");

        self.session = Some(OpenProject {
            name: name.to_string(),
            files,
            selected: None,
        });
        Ok(())
    }

    /// Opens a project, clearing any file selection.
    ///
    /// The name is trimmed as on creation. A project absent from the store
    /// opens as an empty project; it is written on its first change.
    /// Selecting the project that is already open does nothing.
    ///
    /// # Errors
    ///
    /// Fails if the trimmed name is empty or the store cannot be read. The
    /// previous selection is kept.
    #[instrument(skip(self))]
    pub async fn select_project(&mut self, name: &str) -> Result<(), ServiceError> {
        let name = ProjectName::new(name)?;
        if self.current_project() == Some(name.as_str()) {
            return Ok(());
        }

        let files = match self.store.get(&name).await? {
            Some(project) => project.into_parts().1,
            None => {
                tracing::debug!("Project '{name}' is not stored yet, opening it empty");
                Files::new()
            }
        };

        self.session = Some(OpenProject {
            name: name.to_string(),
            files,
            selected: None,
        });
        Ok(())
    }

    /// Begins deleting a project. Nothing happens until the returned value
    /// is confirmed and passed to [`Self::delete_project`].
    ///
    /// The name is trimmed as on creation.
    pub fn request_delete_project(&self, name: &str) -> PendingDelete<ProjectTarget> {
        PendingDelete {
            target: ProjectTarget {
                name: name.trim().to_string(),
            },
        }
    }

    /// Deletes a project, hidden files and all, and closes the session.
    ///
    /// Deleting an absent project succeeds.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be written. The session is left untouched.
    #[instrument(skip_all, fields(project = %confirmed.target.name))]
    pub async fn delete_project(
        &mut self,
        confirmed: Confirmed<ProjectTarget>,
    ) -> Result<(), ServiceError> {
        let name = confirmed.target.name;
        self.store.delete(&name).await?;
        tracing::info!("Deleted project '{name}'");
        self.session = None;
        Ok(())
    }

    /// Visible entries of the selected project: plain files first, then
    /// libraries, each sorted by name.
    ///
    /// # Errors
    ///
    /// Fails if no project is selected.
    pub fn list_files(&self) -> Result<Vec<FileListing>, ServiceError> {
        let open = self.open()?;
        let mut listing: Vec<_> = open
            .files
            .keys()
            .filter(|name| is_visible(name))
            .map(|name| FileListing {
                name: name.clone(),
                kind: if is_library_name(name) {
                    EntryKind::Library
                } else {
                    EntryKind::PlainFile
                },
            })
            .collect();
        listing.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
        Ok(listing)
    }

    /// Decodes an entry of the selected project without selecting it.
    ///
    /// This exposes every sub-file of a library, not only the editable
    /// entry point.
    ///
    /// # Errors
    ///
    /// Fails if no project is selected or it has no such file.
    pub fn entry(&self, name: &str) -> Result<FileEntry, ServiceError> {
        let open = self.open()?;
        let raw = open
            .files
            .get(name)
            .ok_or_else(|| ServiceError::NotFound(Subject::File(name.to_string())))?;
        Ok(FileEntry::decode(name, raw))
    }

    /// Selects a file for editing and returns its editable view.
    ///
    /// For a library, the editable content is its `__init__.py` sub-file, or
    /// empty if it has none. A library whose value cannot be decoded is shown
    /// as its raw text.
    ///
    /// # Errors
    ///
    /// Fails if no project is selected or it has no such file. The selection
    /// is unchanged on failure.
    #[instrument(skip(self))]
    pub fn select_file(&mut self, name: &str) -> Result<FileView, ServiceError> {
        let entry = self.entry(name)?;
        let open = self.open_mut()?;
        open.selected = Some(name.to_string());
        Ok(FileView::new(name, &entry))
    }

    /// Saves new content to the selected file and persists the project.
    ///
    /// Plain files take `content` verbatim. For a library, `content` must be
    /// a JSON object mapping sub-file names to text; it is stored
    /// re-serialised in canonical form. Content identical to what is stored
    /// is not written again.
    ///
    /// # Errors
    ///
    /// Fails if no file is selected, if library content does not parse, or if
    /// the store cannot be written. Nothing changes on failure.
    #[instrument(skip(self, content), fields(bytes = content.len()))]
    pub async fn save_file(&mut self, content: &str) -> Result<(), ServiceError> {
        let open = self.open()?;
        let name = open.selected.clone().ok_or(ServiceError::NoFileSelected)?;

        let raw = if is_library_name(&name) {
            FileEntry::Library(parse_library(content)?).encode()
        } else {
            content.to_string()
        };

        if open.files.get(&name) == Some(&raw) {
            tracing::debug!("File '{name}' is unchanged, skipping write");
            return Ok(());
        }

        let mut files = open.files.clone();
        files.insert(name.clone(), raw);
        self.commit(files).await?;
        tracing::info!("Saved '{name}'");
        Ok(())
    }

    /// Creates an empty plain file and selects it. Returns the stored name.
    ///
    /// # Errors
    ///
    /// Fails if no project is selected, the name lacks the configured suffix,
    /// the file exists, or the store cannot be written.
    #[instrument(skip(self))]
    pub async fn create_file(&mut self, name: &str) -> Result<String, ServiceError> {
        let name = validate_file_name(name, self.config.file_suffix())?;
        self.create_entry(name, String::new()).await
    }

    /// Creates a library `__<identifier>__` holding an empty `__init__.py`
    /// and selects it. Returns the stored name.
    ///
    /// # Errors
    ///
    /// Fails if no project is selected, the identifier is not
    /// `[A-Za-z0-9_]+`, the library exists, or the store cannot be written.
    #[instrument(skip(self))]
    pub async fn create_library(&mut self, identifier: &str) -> Result<String, ServiceError> {
        let name = library_key(identifier)?;
        self.create_entry(name, FileEntry::new_library().encode())
            .await
    }

    async fn create_entry(&mut self, name: String, raw: String) -> Result<String, ServiceError> {
        let open = self.open()?;
        if open.files.contains_key(&name) {
            return Err(ServiceError::AlreadyExists(Subject::File(name)));
        }

        let mut files = open.files.clone();
        files.insert(name.clone(), raw);
        self.commit(files).await?;

        self.open_mut()?.selected = Some(name.clone());
        tracing::info!("Created '{name}'");
        Ok(name)
    }

    /// Begins deleting a file of the selected project. Nothing happens until
    /// the returned value is confirmed and passed to [`Self::delete_file`].
    ///
    /// # Errors
    ///
    /// Fails if no project is selected or it has no such file.
    pub fn request_delete_file(
        &self,
        name: &str,
    ) -> Result<PendingDelete<FileTarget>, ServiceError> {
        let open = self.open()?;
        if !open.files.contains_key(name) {
            return Err(ServiceError::NotFound(Subject::File(name.to_string())));
        }
        Ok(PendingDelete {
            target: FileTarget {
                project: open.name.clone(),
                name: name.to_string(),
            },
        })
    }

    /// Deletes a file and persists the project. If the file was selected, the
    /// selection is cleared.
    ///
    /// # Errors
    ///
    /// Fails if the confirmation was issued for another project, the file is
    /// gone, or the store cannot be written. Nothing changes on failure.
    #[instrument(skip_all, fields(file = %confirmed.target.name))]
    pub async fn delete_file(
        &mut self,
        confirmed: Confirmed<FileTarget>,
    ) -> Result<(), ServiceError> {
        let FileTarget { project, name } = confirmed.target;
        let open = self.open()?;
        if open.name != project {
            return Err(ServiceError::StaleConfirmation(project));
        }
        if !open.files.contains_key(&name) {
            return Err(ServiceError::NotFound(Subject::File(name)));
        }

        let mut files = open.files.clone();
        files.remove(&name);
        self.commit(files).await?;

        let open = self.open_mut()?;
        if open.selected.as_deref() == Some(name.as_str()) {
            open.selected = None;
        }
        tracing::info!("Deleted '{name}'");
        Ok(())
    }

    /// Builds an archive of the selected project's visible files.
    ///
    /// The archive is built from the files as they are at the time of the
    /// call.
    ///
    /// # Errors
    ///
    /// Fails if no project is selected or encoding fails.
    pub fn export_project(&self) -> Result<ArchivePayload, ServiceError> {
        let open = self.open()?;
        Ok(archive::export(&open.name, &open.files)?)
    }

    /// Persists `files` for the open project, then adopts them in memory.
    async fn commit(&mut self, files: Files) -> Result<(), ServiceError> {
        let name = self.open()?.name.clone();
        self.store.put(&name, &files).await?;
        self.open_mut()?.files = files;
        Ok(())
    }

    fn open(&self) -> Result<&OpenProject, ServiceError> {
        self.session.as_ref().ok_or(ServiceError::NoProjectSelected)
    }

    fn open_mut(&mut self) -> Result<&mut OpenProject, ServiceError> {
        self.session.as_mut().ok_or(ServiceError::NoProjectSelected)
    }
}
