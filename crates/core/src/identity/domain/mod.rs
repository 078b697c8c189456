pub mod identity;
pub mod identity_directory;
pub mod identity_resolver;
