use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::ledger::domain::dedup_ledger::{DedupLedger, LedgerError};
use crate::shared::fingerprint::ContentFingerprint;

/// Directory-backed ledger: one empty marker file per fingerprint.
///
/// `try_claim` relies on exclusive file creation, which is atomic on local
/// filesystems, so concurrent processes sharing the directory get a single
/// winner per fingerprint.
pub struct FileDedupLedger {
    dir: PathBuf,
}

impl FileDedupLedger {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| LedgerError::Unavailable(format!(
            "cannot create ledger directory {}: {e}",
            dir.display()
        )))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn marker(&self, fingerprint: &ContentFingerprint) -> PathBuf {
        self.dir.join(fingerprint.to_hex())
    }

    fn io_error(fingerprint: &ContentFingerprint, source: std::io::Error) -> LedgerError {
        LedgerError::Io {
            fingerprint: *fingerprint,
            source,
        }
    }
}

impl DedupLedger for FileDedupLedger {
    fn has_seen(&self, fingerprint: &ContentFingerprint) -> Result<bool, LedgerError> {
        match fs::metadata(self.marker(fingerprint)) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Self::io_error(fingerprint, e)),
        }
    }

    fn mark_seen(&self, fingerprint: &ContentFingerprint) -> Result<(), LedgerError> {
        log::info!("Recording processed image hash {fingerprint}");
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.marker(fingerprint))
            .map_err(|e| Self::io_error(fingerprint, e))?;
        file.flush().map_err(|e| Self::io_error(fingerprint, e))
    }

    fn try_claim(&self, fingerprint: &ContentFingerprint) -> Result<bool, LedgerError> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.marker(fingerprint))
        {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(Self::io_error(fingerprint, e)),
        }
    }

    fn release(&self, fingerprint: &ContentFingerprint) -> Result<(), LedgerError> {
        match fs::remove_file(self.marker(fingerprint)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(fingerprint, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::fingerprint::fingerprint;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("ledger");
        let ledger = FileDedupLedger::open(&dir).unwrap();
        assert!(ledger.dir().is_dir());
    }

    #[test]
    fn test_mark_seen_writes_marker_named_by_hex() {
        let tmp = TempDir::new().unwrap();
        let ledger = FileDedupLedger::open(tmp.path()).unwrap();
        let fp = fingerprint(b"snapshot");

        ledger.mark_seen(&fp).unwrap();

        assert!(tmp.path().join(fp.to_hex()).exists());
        assert!(ledger.has_seen(&fp).unwrap());
    }

    #[test]
    fn test_state_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let fp = fingerprint(b"snapshot");
        FileDedupLedger::open(tmp.path())
            .unwrap()
            .mark_seen(&fp)
            .unwrap();

        let reopened = FileDedupLedger::open(tmp.path()).unwrap();

        assert!(reopened.has_seen(&fp).unwrap());
        assert!(!reopened.try_claim(&fp).unwrap());
    }

    #[test]
    fn test_claim_then_release() {
        let tmp = TempDir::new().unwrap();
        let ledger = FileDedupLedger::open(tmp.path()).unwrap();
        let fp = fingerprint(b"snapshot");

        assert!(ledger.try_claim(&fp).unwrap());
        assert!(!ledger.try_claim(&fp).unwrap());
        ledger.release(&fp).unwrap();
        assert!(!ledger.has_seen(&fp).unwrap());
        ledger.release(&fp).unwrap();
    }

    #[test]
    fn test_mark_seen_after_claim_keeps_it_seen() {
        let tmp = TempDir::new().unwrap();
        let ledger = FileDedupLedger::open(tmp.path()).unwrap();
        let fp = fingerprint(b"snapshot");

        ledger.try_claim(&fp).unwrap();
        ledger.mark_seen(&fp).unwrap();

        assert!(ledger.has_seen(&fp).unwrap());
    }
}
