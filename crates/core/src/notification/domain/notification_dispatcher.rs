use crate::annotation::domain::summary::Summary;
use crate::notification::domain::notification_channel::{
    Attachment, DeliveryError, NotificationChannel,
};
use crate::shared::constants::{DEFAULT_ATTACHMENT_NAME, DEFAULT_MIME_TYPE};

/// Sends the summary and snapshot to the configured channel.
pub struct NotificationDispatcher {
    channel: Box<dyn NotificationChannel>,
    channel_id: String,
    filename: String,
}

impl NotificationDispatcher {
    pub fn new(channel: Box<dyn NotificationChannel>, channel_id: impl Into<String>) -> Self {
        Self {
            channel,
            channel_id: channel_id.into(),
            filename: DEFAULT_ATTACHMENT_NAME.to_string(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn send(&self, summary: &Summary, image: &[u8]) -> Result<(), DeliveryError> {
        let mime_type = mime_type_of(image);
        log::info!(
            "Posting {} bytes ({mime_type}) to channel {}",
            image.len(),
            self.channel_id
        );
        self.channel.deliver(
            &self.channel_id,
            summary.as_str(),
            Attachment {
                bytes: image,
                filename: &self.filename,
                mime_type,
            },
        )
    }
}

fn mime_type_of(image: &[u8]) -> &'static str {
    image::guess_format(image)
        .map(|f| f.to_mime_type())
        .unwrap_or(DEFAULT_MIME_TYPE)
}
