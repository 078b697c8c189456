use crate::detection::domain::detected_object::ObjectDetections;
use crate::detection::domain::face_match::FaceMatch;
use crate::identity::domain::identity::Identity;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::{FACE_BOX_COLOR, OBJECT_BOX_COLOR};

/// A labelled box to draw, still in normalized coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    pub bounding_box: BoundingBox,
    pub label: String,
    pub color: [u8; 3],
}

/// Everything to draw on one snapshot. Objects first, then the face.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnotationPlan {
    overlays: Vec<Overlay>,
}

impl AnnotationPlan {
    pub fn build(
        objects: &ObjectDetections,
        face: Option<(&FaceMatch, &Identity)>,
        min_confidence: f32,
    ) -> Self {
        let mut overlays: Vec<Overlay> = objects
            .objects
            .iter()
            .flat_map(|object| {
                object
                    .drawable_instances(min_confidence)
                    .map(move |instance| Overlay {
                        bounding_box: instance.bounding_box,
                        label: object.name.clone(),
                        color: OBJECT_BOX_COLOR,
                    })
            })
            .collect();

        if let Some((face, identity)) = face {
            overlays.push(Overlay {
                bounding_box: face.searched_face_box,
                label: identity.name().to_string(),
                color: FACE_BOX_COLOR,
            });
        }

        Self { overlays }
    }

    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }
}
