use crate::detection::domain::detected_object::DetectedObject;
use crate::detection::domain::object_detector::ObjectDetector;
use crate::detection::domain::provider_error::ProviderError;

use super::provider_endpoint::ProviderEndpoint;
use super::provider_wire::parse_labels;

/// Object detection backed by a remote label-detection endpoint.
pub struct HttpLabelDetector {
    endpoint: ProviderEndpoint,
}

impl HttpLabelDetector {
    pub fn new(endpoint: ProviderEndpoint) -> Self {
        Self { endpoint }
    }
}

impl ObjectDetector for HttpLabelDetector {
    fn detect(
        &self,
        image: &[u8],
        min_confidence: f32,
    ) -> Result<Vec<DetectedObject>, ProviderError> {
        log::debug!("Detecting labels via {}", self.endpoint.url());
        let body = self
            .endpoint
            .post_image(image, &[("MinConfidence", min_confidence.to_string())])?;
        parse_labels(&body)
    }
}
