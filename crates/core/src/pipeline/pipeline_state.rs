use std::fmt;

use thiserror::Error;

use crate::annotation::domain::summary::Summary;
use crate::notification::domain::notification_channel::DeliveryError;
use crate::shared::fingerprint::ContentFingerprint;
use crate::storage::domain::object_store::FetchError;

/// Stages a snapshot moves through, in order.
///
/// `Skipped` and `Recorded` are terminal. An invocation that fails to fetch
/// or to deliver stops where it failed and never reaches `Recorded`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Fetched,
    HashChecked,
    Skipped,
    Detecting,
    Annotated,
    Notified,
    Recorded,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Fetched => "fetched",
            PipelineState::HashChecked => "hash_checked",
            PipelineState::Skipped => "skipped",
            PipelineState::Detecting => "detecting",
            PipelineState::Annotated => "annotated",
            PipelineState::Notified => "notified",
            PipelineState::Recorded => "recorded",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Skipped | PipelineState::Recorded)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one successful invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// The fingerprint was already processed; nothing was sent.
    Skipped { fingerprint: ContentFingerprint },
    /// The notification went out. `recorded == false` means the ledger write
    /// afterwards failed, so a redelivery would not be recognised.
    Delivered {
        fingerprint: ContentFingerprint,
        summary: Summary,
        re_encoded: bool,
        recorded: bool,
    },
}

impl Outcome {
    pub fn fingerprint(&self) -> &ContentFingerprint {
        match self {
            Outcome::Skipped { fingerprint } | Outcome::Delivered { fingerprint, .. } => fingerprint,
        }
    }

    pub fn final_state(&self) -> PipelineState {
        match self {
            Outcome::Skipped { .. } => PipelineState::Skipped,
            Outcome::Delivered { recorded: true, .. } => PipelineState::Recorded,
            Outcome::Delivered { recorded: false, .. } => PipelineState::Notified,
        }
    }

    pub fn summary(&self) -> Option<&Summary> {
        match self {
            Outcome::Skipped { .. } => None,
            Outcome::Delivered { summary, .. } => Some(summary),
        }
    }
}

/// The only failures that abort an invocation.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to fetch snapshot: {0}")]
    Fetch(#[from] FetchError),
    #[error("failed to deliver notification: {0}")]
    Delivery(#[from] DeliveryError),
}
