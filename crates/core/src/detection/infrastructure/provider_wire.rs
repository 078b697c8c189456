//! JSON shapes returned by the label-detection and face-search endpoints.

use serde::Deserialize;

use crate::detection::domain::detected_object::{DetectedObject, ObjectInstance};
use crate::detection::domain::face_match::FaceMatch;
use crate::detection::domain::provider_error::ProviderError;
use crate::shared::bounding_box::BoundingBox;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct DetectLabelsResponse {
    #[serde(default)]
    labels: Vec<WireLabel>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct WireLabel {
    name: String,
    confidence: f32,
    #[serde(default)]
    instances: Vec<WireInstance>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct WireInstance {
    bounding_box: BoundingBox,
    confidence: f32,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct SearchFacesResponse {
    #[serde(default)]
    searched_face_bounding_box: Option<BoundingBox>,
    #[serde(default)]
    face_matches: Vec<WireFaceMatch>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct WireFaceMatch {
    face: WireFace,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct WireFace {
    face_id: String,
    confidence: f32,
}

pub fn parse_labels(body: &str) -> Result<Vec<DetectedObject>, ProviderError> {
    let response: DetectLabelsResponse = serde_json::from_str(body)?;
    Ok(response
        .labels
        .into_iter()
        .map(|label| DetectedObject {
            name: label.name,
            confidence: label.confidence,
            instances: label
                .instances
                .into_iter()
                .map(|i| ObjectInstance {
                    bounding_box: i.bounding_box,
                    confidence: i.confidence,
                })
                .collect(),
        })
        .collect())
}

/// Every match shares the searched face's box: the search runs against the
/// largest face in the image only.
pub fn parse_face_matches(body: &str) -> Result<Vec<FaceMatch>, ProviderError> {
    let response: SearchFacesResponse = serde_json::from_str(body)?;
    let searched_face_box = response.searched_face_bounding_box.unwrap_or_default();
    Ok(response
        .face_matches
        .into_iter()
        .map(|m| FaceMatch {
            face_id: m.face.face_id,
            confidence: m.face.confidence,
            searched_face_box,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_labels_with_instances() {
        let body = r#"{
            "Labels": [
                {"Name": "Package", "Confidence": 98.2, "Instances": [
                    {"BoundingBox": {"Width": 0.5, "Height": 0.5, "Left": 0.0, "Top": 0.0}, "Confidence": 97.1}
                ], "Parents": []},
                {"Name": "Porch", "Confidence": 85.0}
            ],
            "LabelModelVersion": "2.0"
        }"#;

        let objects = parse_labels(body).unwrap();

        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name, "Package");
        assert_relative_eq!(objects[0].confidence, 98.2);
        assert_eq!(objects[0].instances.len(), 1);
        assert_relative_eq!(objects[0].instances[0].bounding_box.width, 0.5);
        assert!(objects[1].instances.is_empty());
    }

    #[test]
    fn test_parse_labels_missing_list_is_empty() {
        assert!(parse_labels("{}").unwrap().is_empty());
    }

    #[test]
    fn test_parse_labels_rejects_garbage() {
        assert!(matches!(
            parse_labels("<html>"),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_face_matches_uses_searched_box() {
        let body = r#"{
            "SearchedFaceBoundingBox": {"Width": 0.2, "Height": 0.3, "Left": 0.4, "Top": 0.1},
            "SearchedFaceConfidence": 99.9,
            "FaceMatches": [
                {"Similarity": 99.1, "Face": {"FaceId": "f-1", "Confidence": 91.7,
                  "BoundingBox": {"Width": 0.9, "Height": 0.9, "Left": 0.0, "Top": 0.0}}},
                {"Similarity": 97.0, "Face": {"FaceId": "f-2", "Confidence": 88.0}}
            ]
        }"#;

        let matches = parse_face_matches(body).unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].face_id, "f-1");
        assert_relative_eq!(matches[0].confidence, 91.7);
        assert_eq!(matches[0].searched_face_box, BoundingBox::new(0.4, 0.1, 0.2, 0.3));
        assert_eq!(matches[1].searched_face_box, matches[0].searched_face_box);
    }

    #[test]
    fn test_parse_face_matches_empty() {
        let body = r#"{"FaceMatches": []}"#;
        assert!(parse_face_matches(body).unwrap().is_empty());
    }
}
