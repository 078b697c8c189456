use crate::detection::domain::face_match::FaceMatch;
use crate::detection::domain::face_searcher::FaceSearcher;
use crate::detection::domain::provider_error::ProviderError;

use super::provider_endpoint::ProviderEndpoint;
use super::provider_wire::parse_face_matches;

/// Face search backed by a remote search-faces-by-image endpoint.
pub struct HttpFaceSearcher {
    endpoint: ProviderEndpoint,
}

impl HttpFaceSearcher {
    pub fn new(endpoint: ProviderEndpoint) -> Self {
        Self { endpoint }
    }
}

impl FaceSearcher for HttpFaceSearcher {
    fn search(&self, image: &[u8], collection_id: &str) -> Result<Vec<FaceMatch>, ProviderError> {
        log::debug!(
            "Searching collection {collection_id} via {}",
            self.endpoint.url()
        );
        let body = self
            .endpoint
            .post_image(image, &[("CollectionId", collection_id.to_string())])?;
        parse_face_matches(&body)
    }
}
