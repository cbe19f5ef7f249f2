//! Domain models for project workspaces.
//!
//! This module contains the project record, the interpretation of stored
//! file values as plain files or libraries, and configuration.

/// Projects and their validated names.
pub mod project;
pub use project::{Files, Project, ProjectName};

/// Interpretation of stored file values, and the naming rules for new
/// entries.
pub mod entry;
pub use entry::{
    is_library_name, is_visible, library_key, parse_library, validate_file_name, EntryKind,
    FileEntry, InvalidNameError, LibraryContentError, LibraryFiles, LIBRARY_ENTRY_POINT,
};

mod config;
pub use config::Config;
