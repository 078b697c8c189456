pub mod annotation_engine;
pub mod annotation_plan;
pub mod overlay_renderer;
pub mod summary;
