use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a project store.
///
/// This struct holds the settings that control naming of new plain files and
/// of exported archives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The suffix every new plain file must end with.
    ///
    /// For example, '.py'.
    file_suffix: String,

    /// The extension given to exported archives, without the leading dot.
    archive_extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file_suffix: default_file_suffix(),
            archive_extension: default_archive_extension(),
        }
    }
}

impl Config {
    /// The name of the configuration file inside a store directory.
    pub const FILE_NAME: &str = "config.toml";

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads the configuration kept in a store directory, falling back to
    /// defaults when it is missing or unreadable.
    #[must_use]
    pub fn load_or_default(root: &Path) -> Self {
        let path = root.join(Self::FILE_NAME);
        Self::load(&path).unwrap_or_else(|e| {
            tracing::debug!("Failed to load config: {e}");
            Self::default()
        })
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the suffix required of new plain files.
    #[must_use]
    pub fn file_suffix(&self) -> &str {
        &self.file_suffix
    }

    /// Returns the extension used for exported archives.
    #[must_use]
    pub fn archive_extension(&self) -> &str {
        &self.archive_extension
    }

    /// Sets the suffix required of new plain files.
    pub fn set_file_suffix(&mut self, suffix: impl Into<String>) {
        self.file_suffix = suffix.into();
    }
}

fn default_file_suffix() -> String {
    ".py".to_string()
}

fn default_archive_extension() -> String {
    "zip".to_string()
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_file_suffix")]
        file_suffix: String,

        #[serde(default = "default_archive_extension")]
        archive_extension: String,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                file_suffix,
                archive_extension,
            } => Self {
                file_suffix,
                archive_extension,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            file_suffix: config.file_suffix,
            archive_extension: config.archive_extension,
        }
    }
}
