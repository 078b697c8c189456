use crate::shared::bounding_box::BoundingBox;

/// A face in the image that matched a face stored in the searched collection.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceMatch {
    pub face_id: String,
    pub confidence: f32,
    pub searched_face_box: BoundingBox,
}
