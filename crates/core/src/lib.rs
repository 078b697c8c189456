//! Idempotent detection-and-annotation pipeline for doorbell camera snapshots.
//!
//! A newly stored snapshot is fingerprinted, gated against a dedup ledger,
//! run through object detection and face search, annotated with labelled
//! boxes and posted with a text summary to a chat channel.

pub mod annotation;
pub mod detection;
pub mod identity;
pub mod ledger;
pub mod notification;
pub mod pipeline;
pub mod shared;
pub mod storage;
