use crate::detection::domain::face_match::FaceMatch;
use crate::detection::domain::provider_error::ProviderError;

/// Domain interface for searching a face collection with the faces in an image.
///
/// Matches are returned best-first; an empty vector means no stored face matched.
pub trait FaceSearcher: Send + Sync {
    fn search(&self, image: &[u8], collection_id: &str) -> Result<Vec<FaceMatch>, ProviderError>;
}
