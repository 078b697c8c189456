use crate::annotation::domain::annotation_plan::AnnotationPlan;
use crate::annotation::domain::overlay_renderer::OverlayRenderer;
use crate::annotation::domain::summary::Summary;
use crate::detection::domain::detected_object::ObjectDetections;
use crate::detection::domain::face_match::FaceMatch;
use crate::identity::domain::identity::Identity;
use crate::shared::constants::OVERLAY_MIN_CONFIDENCE;

/// Image bytes ready for delivery.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotatedImage {
    pub bytes: Vec<u8>,
    /// `false` when the input bytes are passed through untouched.
    pub re_encoded: bool,
}

/// Turns detection results into an annotated snapshot and its summary.
pub struct AnnotationEngine {
    renderer: Box<dyn OverlayRenderer>,
    min_confidence: f32,
}

impl AnnotationEngine {
    pub fn new(renderer: Box<dyn OverlayRenderer>) -> Self {
        Self {
            renderer,
            min_confidence: OVERLAY_MIN_CONFIDENCE,
        }
    }

    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Builds the summary and, when anything qualifies for drawing, renders
    /// the overlays. `identity` is only consulted when `face` is present.
    ///
    /// With nothing to draw the original bytes are returned without a
    /// decode/encode round trip. A rendering failure also falls back to the
    /// original bytes so the snapshot is still delivered.
    pub fn annotate(
        &self,
        image: &[u8],
        objects: &ObjectDetections,
        face: Option<&FaceMatch>,
        identity: &Identity,
    ) -> (AnnotatedImage, Summary) {
        let recognized = face.map(|f| (f, identity));
        let summary = Summary::compose(objects, recognized);
        let plan = AnnotationPlan::build(objects, recognized, self.min_confidence);

        if plan.is_empty() {
            return (Self::passthrough(image), summary);
        }

        let annotated = match self.renderer.render(image, &plan) {
            Ok(bytes) => {
                log::debug!("Drew {} overlays", plan.len());
                AnnotatedImage {
                    bytes,
                    re_encoded: true,
                }
            }
            Err(e) => {
                log::warn!("Annotation failed, delivering original image: {e}");
                Self::passthrough(image)
            }
        };
        (annotated, summary)
    }

    fn passthrough(image: &[u8]) -> AnnotatedImage {
        AnnotatedImage {
            bytes: image.to_vec(),
            re_encoded: false,
        }
    }
}
