//! Deterministic query fingerprinting derived from the serialized text.

use sha2::{Digest, Sha256};
use std::fmt;

///
/// QueryFingerprint
///
/// Stable key for a compiled query; equal text gives equal fingerprints.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct QueryFingerprint([u8; 32]);

impl QueryFingerprint {
    pub(crate) fn of_text(text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"queryfp:v1");
        hasher.update(text.as_bytes());
        let digest = hasher.finalize();

        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            use std::fmt::Write as _;
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

impl fmt::Display for QueryFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}
