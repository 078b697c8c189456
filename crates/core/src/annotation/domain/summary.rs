use std::fmt;

use crate::detection::domain::detected_object::ObjectDetections;
use crate::detection::domain::face_match::FaceMatch;
use crate::identity::domain::identity::Identity;
use crate::shared::constants::{NO_FACES_PHRASE, NO_OBJECTS_PHRASE};

/// Human-readable message delivered alongside the snapshot.
///
/// Two lines: `Objects: ...` then `People: ...`, each with a fixed fallback
/// phrase when its category is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary(String);

impl Summary {
    pub fn compose(objects: &ObjectDetections, face: Option<(&FaceMatch, &Identity)>) -> Self {
        Self(format!(
            "Objects: {}\nPeople: {}",
            objects_text(objects),
            people_text(face)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn objects_text(objects: &ObjectDetections) -> String {
    if objects.is_empty() {
        return NO_OBJECTS_PHRASE.to_string();
    }
    objects.names().collect::<Vec<_>>().join(", ")
}

// A recognized person carries a trailing space after the percentage; the
// unknown case reports no confidence.
fn people_text(face: Option<(&FaceMatch, &Identity)>) -> String {
    match face {
        None => NO_FACES_PHRASE.to_string(),
        Some((face, identity)) if identity.is_known() => {
            format!("{} ({}%) ", identity.name(), face.confidence as u32)
        }
        Some((_, identity)) => identity.name().to_string(),
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detected_object::DetectedObject;
    use crate::shared::bounding_box::BoundingBox;
    use rstest::rstest;

    fn labels(names: &[&str]) -> ObjectDetections {
        ObjectDetections::found(
            names
                .iter()
                .map(|n| DetectedObject {
                    name: n.to_string(),
                    confidence: 85.0,
                    instances: vec![],
                })
                .collect(),
        )
    }

    fn face(confidence: f32) -> FaceMatch {
        FaceMatch {
            face_id: "f-1".into(),
            confidence,
            searched_face_box: BoundingBox::default(),
        }
    }

    #[test]
    fn test_nothing_found() {
        let summary = Summary::compose(&labels(&[]), None);
        assert_eq!(
            summary.as_str(),
            "Objects: None objects found.\nPeople: No faces found."
        );
    }

    #[test]
    fn test_degraded_objects_use_fallback_phrase() {
        let summary = Summary::compose(&ObjectDetections::degraded(), None);
        assert!(summary.as_str().starts_with("Objects: None objects found.\n"));
    }

    #[test]
    fn test_known_person_with_truncated_confidence() {
        let f = face(91.7);
        let summary = Summary::compose(&labels(&["Package"]), Some((&f, &Identity::known("Jane Doe"))));
        assert_eq!(summary.as_str(), "Objects: Package\nPeople: Jane Doe (91%) ");
    }

    #[test]
    fn test_unknown_person_has_no_confidence() {
        let f = face(99.0);
        let summary = Summary::compose(&labels(&[]), Some((&f, &Identity::Unknown)));
        assert_eq!(
            summary.as_str(),
            "Objects: None objects found.\nPeople: Unknown Person"
        );
    }

    #[rstest]
    #[case(&["Person"], "Objects: Person\n")]
    #[case(&["Person", "Package", "Door"], "Objects: Person, Package, Door\n")]
    fn test_object_names_are_comma_joined(#[case] names: &[&str], #[case] prefix: &str) {
        let summary = Summary::compose(&labels(names), None);
        assert!(summary.as_str().starts_with(prefix));
    }
}
