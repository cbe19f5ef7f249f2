//! Local Project Workspaces
//!
//! Projects are named collections of text files kept in a durable store.
//! Files whose names look like `__name__` are libraries: a single stored
//! value holding a JSON mapping of sub-files, which export unpacks into a
//! directory of its own.

pub mod domain;
pub use domain::{
    Config, EntryKind, FileEntry, Files, InvalidNameError, LibraryContentError, LibraryFiles,
    Project, ProjectName,
};

/// Durable and in-memory stores for project records.
pub mod storage;
pub use storage::{DirectoryStore, MemoryStore, ProjectStore, StoreError};

/// Session-oriented operations over a project store.
pub mod service;
pub use service::{
    Confirmed, FileListing, FileTarget, FileView, PendingDelete, ProjectService, ProjectTarget,
    ServiceError, SessionState, Subject,
};

/// ZIP export of a project's visible files.
pub mod archive;
pub use archive::{export, ArchivePayload, ExportError};
