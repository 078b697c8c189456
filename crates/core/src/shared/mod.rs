pub mod bounding_box;
pub mod constants;
pub mod fingerprint;
pub mod settings;
