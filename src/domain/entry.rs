//! Plain files and libraries
//!
//! A project stores every file as a flat `name -> text` pair. Names of the
//! form `__name__` denote libraries, whose stored text is a JSON object
//! mapping sub-file names to their contents. This lets a flat store carry
//! one level of folders.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;

/// The sub-files of a library, keyed by sub-file name.
pub type LibraryFiles = BTreeMap<String, String>;

/// The sub-file every library is created with, and the one surfaced for
/// editing.
pub const LIBRARY_ENTRY_POINT: &str = "__init__.py";

static LIBRARY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^__.+__$").expect("library name pattern is valid"));

static LIBRARY_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("library identifier pattern is valid"));

/// Whether a stored file name denotes a library (`__name__`).
#[must_use]
pub fn is_library_name(name: &str) -> bool {
    LIBRARY_NAME.is_match(name)
}

/// Whether an entry should appear in listings and exports.
///
/// Names starting with `.` or `%` are reserved for internal use. They stay in
/// storage but are never shown.
#[must_use]
pub fn is_visible(name: &str) -> bool {
    !name.starts_with('.') && !name.starts_with('%')
}

/// Builds the stored key for a new library from a bare identifier.
///
/// The identifier is trimmed and must match `[A-Za-z0-9_]+`.
///
/// # Errors
///
/// Returns [`InvalidNameError::LibraryIdentifier`] if the identifier contains
/// anything else.
pub fn library_key(identifier: &str) -> Result<String, InvalidNameError> {
    let identifier = identifier.trim();
    if !LIBRARY_IDENTIFIER.is_match(identifier) {
        return Err(InvalidNameError::LibraryIdentifier(identifier.to_string()));
    }
    Ok(format!("__{identifier}__"))
}

/// Validates the name of a new plain file, returning the trimmed name.
///
/// # Errors
///
/// Returns [`InvalidNameError::PathSeparator`] if the name contains `/` or
/// `\`, and [`InvalidNameError::MissingSuffix`] unless it ends with `suffix`.
pub fn validate_file_name(name: &str, suffix: &str) -> Result<String, InvalidNameError> {
    let name = name.trim();
    if name.contains(['/', '\\']) {
        return Err(InvalidNameError::PathSeparator(name.to_string()));
    }
    if !name.ends_with(suffix) {
        return Err(InvalidNameError::MissingSuffix {
            name: name.to_string(),
            suffix: suffix.to_string(),
        });
    }
    Ok(name.to_string())
}

/// Parses library text into its sub-file mapping.
///
/// # Errors
///
/// Fails unless `raw` is a JSON object whose values are all strings.
pub fn parse_library(raw: &str) -> Result<LibraryFiles, LibraryContentError> {
    serde_json::from_str(raw).map_err(LibraryContentError)
}

/// The logical interpretation of a stored file value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEntry {
    /// Ordinary text. The content is the stored value itself.
    PlainFile(String),
    /// A pseudo-folder of sub-files.
    Library(LibraryFiles),
}

impl FileEntry {
    /// Interprets a stored value.
    ///
    /// Library-named values that fail to parse degrade to a
    /// [`FileEntry::PlainFile`] carrying the raw text, so that nothing stored
    /// is ever lost to a bad encoding.
    #[must_use]
    pub fn decode(name: &str, raw: &str) -> Self {
        if !is_library_name(name) {
            return Self::PlainFile(raw.to_string());
        }
        match parse_library(raw) {
            Ok(files) => Self::Library(files),
            Err(e) => {
                tracing::debug!("Library '{name}' is not decodable, treating as plain text: {e}");
                Self::PlainFile(raw.to_string())
            }
        }
    }

    /// Produces the stored value for this entry.
    ///
    /// Libraries are written as pretty-printed JSON.
    ///
    /// # Panics
    ///
    /// Panics if serialising a string map to JSON fails, which cannot happen.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::PlainFile(content) => content.clone(),
            Self::Library(files) => {
                serde_json::to_string_pretty(files).expect("a string map always serialises")
            }
        }
    }

    /// A fresh library holding only an empty entry point.
    #[must_use]
    pub fn new_library() -> Self {
        Self::Library(LibraryFiles::from([(
            LIBRARY_ENTRY_POINT.to_string(),
            String::new(),
        )]))
    }

    /// Which kind of entry this is.
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        match self {
            Self::PlainFile(_) => EntryKind::PlainFile,
            Self::Library(_) => EntryKind::Library,
        }
    }

    /// The text offered for editing.
    ///
    /// For a library this is its entry point, or empty if it has none.
    #[must_use]
    pub fn editable_content(&self) -> &str {
        match self {
            Self::PlainFile(content) => content,
            Self::Library(files) => files.get(LIBRARY_ENTRY_POINT).map_or("", String::as_str),
        }
    }
}

/// The two kinds of project entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    /// Ordinary text file.
    PlainFile,
    /// Pseudo-folder stored as a JSON mapping.
    Library,
}

/// Error returned when a user-supplied name breaks a naming rule.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum InvalidNameError {
    /// Project names must contain something other than whitespace.
    #[error("project name cannot be empty")]
    EmptyProjectName,
    /// Plain files must carry the configured suffix.
    #[error("file name '{name}' must end with '{suffix}'")]
    MissingSuffix {
        /// The rejected name.
        name: String,
        /// The required suffix.
        suffix: String,
    },
    /// Files live at the top level of a project.
    #[error("file name '{0}' must not contain a path separator")]
    PathSeparator(String),
    /// Library identifiers are restricted to `[A-Za-z0-9_]+`.
    #[error("invalid library name '{0}': use only letters, digits and underscores")]
    LibraryIdentifier(String),
}

/// Error returned when library text is not a JSON object of strings.
#[derive(Debug, thiserror::Error)]
#[error("invalid library content: {0}")]
pub struct LibraryContentError(#[source] serde_json::Error);

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("__foo__" => true; "library")]
    #[test_case("_____" => true; "single underscore body")]
    #[test_case("foo" => false; "plain")]
    #[test_case("__foo" => false; "missing trailing underscores")]
    #[test_case("foo__" => false; "missing leading underscores")]
    #[test_case("____" => false; "empty body")]
    #[test_case("__init__.py" => false; "dunder file")]
    fn library_names(name: &str) -> bool {
        is_library_name(name)
    }

    #[test_case(".secret" => false; "dot prefix")]
    #[test_case("%meta" => false; "percent prefix")]
    #[test_case("main.py" => true; "plain file")]
    #[test_case("a.hidden" => true; "dot inside")]
    fn visibility(name: &str) -> bool {
        is_visible(name)
    }

    #[test]
    fn library_key_wraps_identifier() {
        assert_eq!(library_key(" utils ").unwrap(), "__utils__");
        assert_eq!(library_key("a_1").unwrap(), "__a_1__");
    }

    #[test_case("my-lib"; "dash")]
    #[test_case("  "; "blank")]
    #[test_case("lib.py"; "dot")]
    #[test_case("sp ace"; "inner space")]
    fn library_key_rejects(identifier: &str) {
        assert!(matches!(
            library_key(identifier),
            Err(InvalidNameError::LibraryIdentifier(_))
        ));
    }

    #[test]
    fn file_names_need_suffix() {
        assert_eq!(validate_file_name(" main.py ", ".py").unwrap(), "main.py");
        assert_eq!(
            validate_file_name("notes.txt", ".py").unwrap_err(),
            InvalidNameError::MissingSuffix {
                name: "notes.txt".to_string(),
                suffix: ".py".to_string(),
            }
        );
    }

    #[test_case("__lib__/__init__.py"; "forward slash")]
    #[test_case("dir\\main.py"; "backslash")]
    fn file_names_reject_path_separators(name: &str) {
        assert!(matches!(
            validate_file_name(name, ".py"),
            Err(InvalidNameError::PathSeparator(_))
        ));
    }

    #[test_case(&[]; "empty")]
    #[test_case(&[("__init__.py", "from .core import *"), ("core.py", "X = \"quoted\"\n")]; "with entry point")]
    #[test_case(&[("util.py", "x = 1")]; "without entry point")]
    #[test_case(&[("données.py", "π = 3.14 # ✓")]; "unicode")]
    #[test_case(&[("esc.py", "a\\b\t\"c\"\r\n\u{0}")]; "escapes")]
    #[test_case(&[("multi.py", "line one\nline two\n\n")]; "newlines")]
    fn library_round_trips(pairs: &[(&str, &str)]) {
        let entry = FileEntry::Library(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        );

        let decoded = FileEntry::decode("__pkg__", &entry.encode());

        assert_eq!(decoded, entry);
    }

    #[test]
    fn plain_names_never_decode_as_libraries() {
        let entry = FileEntry::decode("data.py", r#"{"__init__.py": ""}"#);
        assert_eq!(entry.kind(), EntryKind::PlainFile);
    }

    #[test_case("{not valid json"; "malformed")]
    #[test_case("[1, 2, 3]"; "not an object")]
    #[test_case(r#"{"__init__.py": 3}"#; "non-string value")]
    fn undecodable_libraries_degrade_to_plain(raw: &str) {
        assert_eq!(
            FileEntry::decode("__lib__", raw),
            FileEntry::PlainFile(raw.to_string())
        );
    }

    #[test]
    fn new_library_exposes_empty_entry_point() {
        let entry = FileEntry::new_library();
        assert_eq!(entry.kind(), EntryKind::Library);
        assert_eq!(entry.editable_content(), "");
        assert_eq!(
            parse_library(&entry.encode()).unwrap(),
            LibraryFiles::from([("__init__.py".to_string(), String::new())])
        );
    }

    #[test]
    fn library_without_entry_point_edits_as_empty() {
        let entry = FileEntry::decode("__lib__", r#"{"util.py": "x = 1"}"#);
        assert_eq!(entry.editable_content(), "");
    }
}
