use thiserror::Error;

use crate::shared::fingerprint::ContentFingerprint;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger I/O failed for {fingerprint}: {source}")]
    Io {
        fingerprint: ContentFingerprint,
        #[source]
        source: std::io::Error,
    },
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Append-only record of fingerprints that have already been processed.
///
/// `has_seen` followed later by `mark_seen` is not atomic: two concurrent
/// callers can both observe "unseen". `try_claim` is the atomic
/// insert-if-absent alternative; a claim that never led to a delivery is
/// withdrawn with `release`.
pub trait DedupLedger: Send {
    fn has_seen(&self, fingerprint: &ContentFingerprint) -> Result<bool, LedgerError>;

    /// Records the fingerprint as processed. Idempotent.
    fn mark_seen(&self, fingerprint: &ContentFingerprint) -> Result<(), LedgerError>;

    /// Inserts the fingerprint only if absent. Returns `true` if this call
    /// inserted it.
    fn try_claim(&self, fingerprint: &ContentFingerprint) -> Result<bool, LedgerError>;

    /// Withdraws a claim. Releasing an absent fingerprint is not an error.
    fn release(&self, fingerprint: &ContentFingerprint) -> Result<(), LedgerError>;
}
