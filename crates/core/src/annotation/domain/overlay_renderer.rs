use std::path::PathBuf;

use thiserror::Error;

use crate::annotation::domain::annotation_plan::AnnotationPlan;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("image codec failed: {0}")]
    Codec(#[from] image::ImageError),
    #[error("failed to read font {}: {source}", path.display())]
    FontIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("font {} is not a usable TrueType/OpenType font", .0.display())]
    InvalidFont(PathBuf),
}

/// Draws an annotation plan onto encoded image bytes.
///
/// Implementations decode, draw and re-encode in memory, returning bytes in
/// the same compressed format as the input.
pub trait OverlayRenderer: Send + Sync {
    fn render(&self, image: &[u8], plan: &AnnotationPlan) -> Result<Vec<u8>, RenderError>;
}
