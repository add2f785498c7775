//! # Content Digest -- MD5 Checksums of Streamed Artifacts
//!
//! Specifications declare artifact checksums as MD5 hex strings. The
//! integrity checker feeds artifacts through an [`Md5Hasher`] chunk by
//! chunk and compares the resulting [`Md5Digest`] against the declared
//! value.
//!
//! MD5 is used here for compatibility with existing specifications, not
//! as a security boundary.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// A finished 16-byte MD5 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Md5Digest {
    /// The raw digest bytes.
    pub bytes: [u8; 16],
}

impl Md5Digest {
    /// Digest a complete in-memory buffer.
    pub fn of(data: &[u8]) -> Self {
        let mut hasher = Md5Hasher::new();
        hasher.update(data);
        hasher.finish()
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Compare against a declared hex checksum, ignoring ASCII case only.
    pub fn matches_hex(&self, declared: &str) -> bool {
        self.to_hex().eq_ignore_ascii_case(declared)
    }
}

impl std::fmt::Display for Md5Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Incremental MD5 state for streamed content.
#[derive(Debug, Clone, Default)]
pub struct Md5Hasher {
    inner: Md5,
}

impl Md5Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb the next chunk.
    pub fn update(&mut self, chunk: &[u8]) {
        self.inner.update(chunk);
    }

    /// Consume the hasher and return the digest.
    pub fn finish(self) -> Md5Digest {
        let hash = self.inner.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hash);
        Md5Digest { bytes }
    }
}
