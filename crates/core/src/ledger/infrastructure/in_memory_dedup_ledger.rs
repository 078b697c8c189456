use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::ledger::domain::dedup_ledger::{DedupLedger, LedgerError};
use crate::shared::fingerprint::ContentFingerprint;

/// Process-local ledger. Clones share the same underlying set.
#[derive(Clone, Default)]
pub struct InMemoryDedupLedger {
    seen: Arc<Mutex<HashSet<ContentFingerprint>>>,
}

impl InMemoryDedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashSet<ContentFingerprint>>, LedgerError> {
        self.seen
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger mutex poisoned".into()))
    }
}

impl DedupLedger for InMemoryDedupLedger {
    fn has_seen(&self, fingerprint: &ContentFingerprint) -> Result<bool, LedgerError> {
        Ok(self.lock()?.contains(fingerprint))
    }

    fn mark_seen(&self, fingerprint: &ContentFingerprint) -> Result<(), LedgerError> {
        self.lock()?.insert(*fingerprint);
        Ok(())
    }

    fn try_claim(&self, fingerprint: &ContentFingerprint) -> Result<bool, LedgerError> {
        Ok(self.lock()?.insert(*fingerprint))
    }

    fn release(&self, fingerprint: &ContentFingerprint) -> Result<(), LedgerError> {
        self.lock()?.remove(fingerprint);
        Ok(())
    }
}
