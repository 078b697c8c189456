/// Minimum confidence requested from the object-detection provider.
pub const OBJECT_MIN_CONFIDENCE: f32 = 80.0;

/// Objects and their instances must strictly exceed this to be drawn.
pub const OVERLAY_MIN_CONFIDENCE: f32 = 95.0;

/// JPEG quality used when re-encoding an annotated image.
pub const REENCODE_QUALITY: u8 = 90;

/// Labels are drawn this many pixels above the top edge of their box.
pub const LABEL_OFFSET_PX: i32 = 20;

pub const LABEL_FONT_SIZE: f32 = 20.0;

pub const OBJECT_BOX_COLOR: [u8; 3] = [255, 0, 255];
pub const FACE_BOX_COLOR: [u8; 3] = [0, 255, 0];

pub const UNKNOWN_PERSON: &str = "Unknown Person";
pub const NO_OBJECTS_PHRASE: &str = "None objects found.";
pub const NO_FACES_PHRASE: &str = "No faces found.";

pub const DEFAULT_ATTACHMENT_NAME: &str = "Camera.jpg";
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

pub const SLACK_UPLOAD_URL: &str = "https://slack.com/api/files.upload";
