use thiserror::Error;

use crate::identity::domain::identity::Identity;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("failed to read identity directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("identity directory is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("identity directory unavailable: {0}")]
    Unavailable(String),
}

/// Lookup of people by the face identifier assigned when they were enrolled.
pub trait IdentityDirectory: Send + Sync {
    /// `Ok(None)` when the face identifier is not enrolled.
    fn lookup(&self, face_id: &str) -> Result<Option<Identity>, DirectoryError>;
}
