use crate::detection::domain::detected_object::DetectedObject;
use crate::detection::domain::provider_error::ProviderError;

/// Domain interface for a label/object detection provider.
///
/// `Sync` so detection can share the provider with a scoped face-search
/// thread.
pub trait ObjectDetector: Send + Sync {
    fn detect(&self, image: &[u8], min_confidence: f32)
        -> Result<Vec<DetectedObject>, ProviderError>;
}
