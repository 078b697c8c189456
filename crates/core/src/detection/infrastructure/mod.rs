pub mod http_face_searcher;
pub mod http_label_detector;
pub mod provider_endpoint;
mod provider_wire;
