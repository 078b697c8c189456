use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("delivery request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("channel rejected the upload: {0}")]
    Rejected(String),
    #[error("channel returned HTTP {0}")]
    Status(u16),
}

/// A file attached to a notification.
#[derive(Clone, Copy, Debug)]
pub struct Attachment<'a> {
    pub bytes: &'a [u8],
    pub filename: &'a str,
    pub mime_type: &'a str,
}

/// Outbound chat channel that accepts a text message with one attached file.
pub trait NotificationChannel: Send {
    fn deliver(
        &self,
        channel_id: &str,
        text: &str,
        attachment: Attachment<'_>,
    ) -> Result<(), DeliveryError>;
}
