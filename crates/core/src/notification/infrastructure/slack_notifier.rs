use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::notification::domain::notification_channel::{
    Attachment, DeliveryError, NotificationChannel,
};
use crate::shared::constants::SLACK_UPLOAD_URL;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize, Debug)]
struct UploadReply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Posts snapshots to a Slack channel through the file-upload API.
pub struct SlackNotifier {
    client: Client,
    token: String,
    upload_url: String,
}

impl SlackNotifier {
    pub fn new(token: impl Into<String>) -> Result<Self, DeliveryError> {
        let client = Client::builder().timeout(UPLOAD_TIMEOUT).build()?;
        Ok(Self {
            client,
            token: token.into(),
            upload_url: SLACK_UPLOAD_URL.to_string(),
        })
    }

    /// Overrides the upload endpoint (e.g. a proxy or a local test server).
    pub fn with_upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = url.into();
        self
    }

    fn form(channel_id: &str, text: &str, attachment: Attachment<'_>) -> Result<Form, DeliveryError> {
        let file = Part::bytes(attachment.bytes.to_vec())
            .file_name(attachment.filename.to_string())
            .mime_str(attachment.mime_type)?;
        Ok(Form::new()
            .text("channels", channel_id.to_string())
            .text("initial_comment", text.to_string())
            .part("file", file))
    }
}

impl NotificationChannel for SlackNotifier {
    fn deliver(
        &self,
        channel_id: &str,
        text: &str,
        attachment: Attachment<'_>,
    ) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.upload_url)
            .bearer_auth(&self.token)
            .multipart(Self::form(channel_id, text, attachment)?)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }

        let reply: UploadReply = response.json()?;
        log::debug!("Upload reply: {reply:?}");
        check_reply(reply)
    }
}

fn check_reply(reply: UploadReply) -> Result<(), DeliveryError> {
    if reply.ok {
        Ok(())
    } else {
        Err(DeliveryError::Rejected(
            reply.error.unwrap_or_else(|| "unknown error".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(json: &str) -> UploadReply {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_ok_reply_is_success() {
        assert!(check_reply(reply(r#"{"ok": true, "file": {"id": "F1"}}"#)).is_ok());
    }

    #[test]
    fn test_error_reply_is_rejected_with_reason() {
        let err = check_reply(reply(r#"{"ok": false, "error": "invalid_auth"}"#)).unwrap_err();
        assert_eq!(err.to_string(), "channel rejected the upload: invalid_auth");
    }

    #[test]
    fn test_error_reply_without_reason() {
        let err = check_reply(reply(r#"{"ok": false}"#)).unwrap_err();
        assert!(matches!(err, DeliveryError::Rejected(r) if r == "unknown error"));
    }

    #[test]
    fn test_form_builds_with_attachment() {
        let form = SlackNotifier::form(
            "C123",
            "Objects: Package",
            Attachment {
                bytes: b"jpeg",
                filename: "Camera.jpg",
                mime_type: "image/jpeg",
            },
        );
        assert!(form.is_ok());
    }

    #[test]
    fn test_invalid_mime_type_is_rejected() {
        let form = SlackNotifier::form(
            "C123",
            "text",
            Attachment {
                bytes: b"jpeg",
                filename: "Camera.jpg",
                mime_type: "not a mime",
            },
        );
        assert!(form.is_err());
    }
}
