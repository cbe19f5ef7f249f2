// On-disk form of a project.
//
// Records are tagged with `_version` so the layout can change without
// breaking stores written by earlier releases.

use serde::{Deserialize, Serialize};

use crate::domain::{Files, Project};

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
pub enum Record {
    #[serde(rename = "1")]
    V1 {
        name: String,
        #[serde(default)]
        files: Files,
    },
}

impl Record {
    pub fn new(name: &str, files: &Files) -> Self {
        Self::V1 {
            name: name.to_string(),
            files: files.clone(),
        }
    }
}

impl From<Record> for Project {
    fn from(record: Record) -> Self {
        match record {
            Record::V1 { name, files } => Self::new(name, files),
        }
    }
}
