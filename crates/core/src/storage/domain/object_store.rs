use std::fmt;

use thiserror::Error;

/// Location of a stored object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("object {0} not found")]
    NotFound(ObjectRef),
    #[error("transient failure reading {object}: {reason}")]
    Transient { object: ObjectRef, reason: String },
}

/// Read access to the object store holding camera snapshots.
pub trait ObjectStore: Send {
    fn get(&self, object: &ObjectRef) -> Result<Vec<u8>, FetchError>;
}
