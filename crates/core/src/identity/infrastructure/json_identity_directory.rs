use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::identity::domain::identity::Identity;
use crate::identity::domain::identity_directory::{DirectoryError, IdentityDirectory};

#[derive(Deserialize)]
#[serde(untagged)]
enum Entry {
    Record {
        #[serde(rename = "FullName")]
        full_name: String,
    },
    Name(String),
}

impl Entry {
    fn into_name(self) -> String {
        match self {
            Entry::Record { full_name } => full_name,
            Entry::Name(name) => name,
        }
    }
}

/// Identity directory loaded once from a JSON object keyed by face id.
///
/// Values are either `{"FullName": "..."}` records or plain name strings.
pub struct JsonIdentityDirectory {
    names: HashMap<String, String>,
}

impl JsonIdentityDirectory {
    pub fn open(path: &Path) -> Result<Self, DirectoryError> {
        let json = fs::read_to_string(path)?;
        let directory = Self::from_json(&json)?;
        log::info!(
            "Loaded {} identities from {}",
            directory.len(),
            path.display()
        );
        Ok(directory)
    }

    pub fn from_json(json: &str) -> Result<Self, DirectoryError> {
        let entries: HashMap<String, Entry> = serde_json::from_str(json)?;
        Ok(Self {
            names: entries
                .into_iter()
                .map(|(id, entry)| (id, entry.into_name()))
                .collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl IdentityDirectory for JsonIdentityDirectory {
    fn lookup(&self, face_id: &str) -> Result<Option<Identity>, DirectoryError> {
        Ok(self.names.get(face_id).map(Identity::known))
    }
}
