use crate::detection::domain::detected_object::ObjectDetections;
use crate::detection::domain::face_match::FaceMatch;
use crate::detection::domain::face_searcher::FaceSearcher;
use crate::detection::domain::object_detector::ObjectDetector;
use crate::shared::constants::OBJECT_MIN_CONFIDENCE;

/// Runs both recognition providers and normalizes their outcomes.
///
/// The two steps are isolated: a failure in one never affects the other, and
/// neither ever returns an error. Provider failures are logged and collapse
/// to an empty result.
pub struct DetectionAggregator {
    object_detector: Box<dyn ObjectDetector>,
    face_searcher: Box<dyn FaceSearcher>,
    collection_id: String,
    min_confidence: f32,
}

impl DetectionAggregator {
    pub fn new(
        object_detector: Box<dyn ObjectDetector>,
        face_searcher: Box<dyn FaceSearcher>,
        collection_id: impl Into<String>,
    ) -> Self {
        Self {
            object_detector,
            face_searcher,
            collection_id: collection_id.into(),
            min_confidence: OBJECT_MIN_CONFIDENCE,
        }
    }

    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn detect_objects(&self, image: &[u8]) -> ObjectDetections {
        match self.object_detector.detect(image, self.min_confidence) {
            Ok(objects) => {
                log::debug!("Object detection returned {} labels", objects.len());
                ObjectDetections::found(objects)
            }
            Err(e) => {
                log::warn!("Unable to detect labels for image: {e}");
                ObjectDetections::degraded()
            }
        }
    }

    /// Returns the first (best-ranked) match only; later matches are dropped.
    pub fn detect_faces(&self, image: &[u8]) -> Option<FaceMatch> {
        match self.face_searcher.search(image, &self.collection_id) {
            Ok(matches) => {
                if matches.len() > 1 {
                    log::debug!(
                        "Face search returned {} matches, keeping the first",
                        matches.len()
                    );
                }
                matches.into_iter().next()
            }
            Err(e) => {
                log::warn!("Face search failed: {e}");
                None
            }
        }
    }
}
