//! Export a project as a ZIP archive.
//!
//! Plain files land at the top level of the archive. Each library becomes a
//! directory named after its key holding one entry per sub-file. Hidden
//! entries are left out. Entries carry content only: every timestamp is the
//! ZIP epoch, so exporting the same files twice yields identical bytes.

use std::{
    collections::BTreeMap,
    io::{self, Cursor, Write},
};

use tracing::instrument;
use zip::{
    write::SimpleFileOptions, CompressionMethod, DateTime, ZipWriter, result::ZipError,
};

use crate::domain::{is_visible, FileEntry, Files};

/// An archive built in memory, ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePayload {
    project: String,
    bytes: Vec<u8>,
}

impl ArchivePayload {
    /// The name of the exported project.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// The archive's file name, `<project>.<extension>`.
    #[must_use]
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{extension}", self.project)
    }

    /// The encoded archive.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the payload, returning the encoded archive.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Failure while encoding an archive.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The ZIP encoder rejected an entry.
    #[error("failed to encode archive: {0}")]
    Zip(#[from] ZipError),
    /// Writing entry content failed.
    #[error("failed to write archive entry: {0}")]
    Io(#[from] io::Error),
}

/// Builds an archive of the visible entries in `files`.
///
/// Library-named entries that cannot be decoded are exported as a single
/// top-level entry holding the raw stored value, as are libraries with an
/// unnamed sub-file. When two entries map to the same archive path, the one
/// written later replaces the earlier and a warning is logged.
///
/// # Errors
///
/// Returns an error if the ZIP encoder fails.
#[instrument(skip(files), fields(count = files.len()))]
pub fn export(project: &str, files: &Files) -> Result<ArchivePayload, ExportError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for (path, entry) in layout(files) {
        match entry {
            ArchiveEntry::Directory => zip.add_directory(path, options)?,
            ArchiveEntry::File(content) => {
                zip.start_file(path, options)?;
                zip.write_all(content.as_bytes())?;
            }
        }
    }

    let bytes = zip.finish()?.into_inner();
    tracing::info!("Exported project '{project}' ({} bytes)", bytes.len());

    Ok(ArchivePayload {
        project: project.to_string(),
        bytes,
    })
}

#[derive(Debug, PartialEq, Eq)]
enum ArchiveEntry {
    Directory,
    File(String),
}

/// Maps every archive path to what is written there.
fn layout(files: &Files) -> BTreeMap<String, ArchiveEntry> {
    let mut entries = BTreeMap::new();

    for (name, raw) in files.iter().filter(|(name, _)| is_visible(name)) {
        match FileEntry::decode(name, raw) {
            FileEntry::Library(sub_files) if sub_files.contains_key("") => {
                tracing::warn!("Library '{name}' has an unnamed sub-file, exporting it as one file");
                insert_file(&mut entries, name.clone(), raw.clone());
            }
            FileEntry::Library(sub_files) => {
                entries
                    .entry(format!("{name}/"))
                    .or_insert(ArchiveEntry::Directory);
                for (sub_name, content) in sub_files {
                    insert_file(&mut entries, format!("{name}/{sub_name}"), content);
                }
            }
            FileEntry::PlainFile(content) => insert_file(&mut entries, name.clone(), content),
        }
    }

    entries
}

fn insert_file(entries: &mut BTreeMap<String, ArchiveEntry>, path: String, content: String) {
    if entries
        .insert(path.clone(), ArchiveEntry::File(content))
        .is_some()
    {
        tracing::warn!("Archive path '{path}' is used twice, keeping the later entry");
    }
}
