pub mod detected_object;
pub mod detection_aggregator;
pub mod face_match;
pub mod face_searcher;
pub mod object_detector;
pub mod provider_error;
