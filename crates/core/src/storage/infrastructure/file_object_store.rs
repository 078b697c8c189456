use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::storage::domain::object_store::{FetchError, ObjectRef, ObjectStore};

/// Object store laid out on disk as `<root>/<bucket>/<key>`.
pub struct FileObjectStore {
    root: PathBuf,
}

impl FileObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, object: &ObjectRef) -> Option<PathBuf> {
        let relative = Path::new(&object.bucket).join(&object.key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl ObjectStore for FileObjectStore {
    fn get(&self, object: &ObjectRef) -> Result<Vec<u8>, FetchError> {
        let path = self
            .path_for(object)
            .ok_or_else(|| FetchError::NotFound(object.clone()))?;
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FetchError::NotFound(object.clone()),
            _ => FetchError::Transient {
                object: object.clone(),
                reason: e.to_string(),
            },
        })
    }
}
