use std::{collections::BTreeMap, fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;

use crate::domain::InvalidNameError;

/// The files of a project, keyed by file name.
///
/// Values are the raw stored text. Library entries hold an encoded mapping
/// of sub-files, see [`FileEntry`](crate::FileEntry).
pub type Files = BTreeMap<String, String>;

/// A validated project name.
///
/// Names are trimmed of surrounding whitespace and must not be empty
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProjectName(NonEmptyString);

impl ProjectName {
    /// Creates a new `ProjectName`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNameError::EmptyProjectName`] if nothing remains after
    /// trimming.
    pub fn new(name: &str) -> Result<Self, InvalidNameError> {
        NonEmptyString::new(name.trim().to_string())
            .map(Self)
            .map_err(|_| InvalidNameError::EmptyProjectName)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for ProjectName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl AsRef<str> for ProjectName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectName {
    type Err = InvalidNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A named collection of files.
///
/// The name is the primary key in a [`ProjectStore`](crate::ProjectStore)
/// and never changes once the project exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    name: String,
    files: Files,
}

impl Project {
    /// Construct a project from its name and files.
    #[must_use]
    pub fn new(name: impl Into<String>, files: Files) -> Self {
        Self {
            name: name.into(),
            files,
        }
    }

    /// An empty project with the given name.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Files::new())
    }

    /// The project's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The project's raw file mapping.
    #[must_use]
    pub const fn files(&self) -> &Files {
        &self.files
    }

    /// Consumes the project, returning its name and files.
    #[must_use]
    pub fn into_parts(self) -> (String, Files) {
        (self.name, self.files)
    }
}
