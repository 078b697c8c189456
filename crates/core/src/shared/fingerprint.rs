use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// 128-bit content digest of an image, used as the dedup key.
///
/// Identical bytes always produce the same fingerprint. Rendered as 32
/// lowercase hex characters, which is also the form stored in ledgers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContentFingerprint([u8; 16]);

impl ContentFingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        Self(md5::compute(bytes).0)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

/// Computes the fingerprint of raw image bytes. Pure and infallible.
pub fn fingerprint(bytes: &[u8]) -> ContentFingerprint {
    ContentFingerprint::of(bytes)
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid fingerprint {0:?}: expected 32 hex characters")]
pub struct ParseFingerprintError(String);

impl FromStr for ContentFingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 || !s.is_ascii() {
            return Err(ParseFingerprintError(s.to_string()));
        }
        let mut digest = [0u8; 16];
        for (i, byte) in digest.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| ParseFingerprintError(s.to_string()))?;
        }
        Ok(Self(digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_same_bytes_same_fingerprint() {
        let bytes = b"\xff\xd8\xff\xe0 doorbell snapshot";
        assert_eq!(fingerprint(bytes), fingerprint(bytes));
    }

    #[test]
    fn test_different_bytes_different_fingerprint() {
        assert_ne!(fingerprint(b"frame-1"), fingerprint(b"frame-2"));
    }

    #[test]
    fn test_single_bit_flip_changes_fingerprint() {
        let a = vec![0u8; 4096];
        let mut b = a.clone();
        b[2048] ^= 1;
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[rstest]
    #[case(b"", "d41d8cd98f00b204e9800998ecf8427e")]
    #[case(b"abc", "900150983cd24fb0d6963f7d28e17f72")]
    fn test_known_digests(#[case] input: &[u8], #[case] expected: &str) {
        assert_eq!(fingerprint(input).to_hex(), expected);
    }

    #[test]
    fn test_hex_form_parses_back() {
        let fp = fingerprint(b"porch");
        let parsed: ContentFingerprint = fp.to_hex().parse().unwrap();
        assert_eq!(parsed, fp);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("zz0150983cd24fb0d6963f7d28e17f72")]
    fn test_invalid_hex_rejected(#[case] input: &str) {
        assert!(input.parse::<ContentFingerprint>().is_err());
    }
}
