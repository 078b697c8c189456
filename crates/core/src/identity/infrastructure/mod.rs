pub mod json_identity_directory;
