use crate::identity::domain::identity::Identity;
use crate::identity::domain::identity_directory::IdentityDirectory;

/// Maps face identifiers to identities, treating lookup failures as misses.
pub struct IdentityResolver {
    directory: Box<dyn IdentityDirectory>,
}

impl IdentityResolver {
    pub fn new(directory: Box<dyn IdentityDirectory>) -> Self {
        Self { directory }
    }

    pub fn resolve(&self, face_id: &str) -> Identity {
        match self.directory.lookup(face_id) {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                log::info!("Face {face_id} is not in the identity directory");
                Identity::Unknown
            }
            Err(e) => {
                log::warn!("Identity lookup for face {face_id} failed: {e}");
                Identity::Unknown
            }
        }
    }
}
