//! Module text fingerprints
//!
//! Provides [`ContentHash`], a 32-byte Blake3 digest of a module's text.
//! Rewrite buffers record the fingerprint of the text they were checked out
//! against so a commit can detect that the module changed underneath them.

use std::fmt::{self, Display, Formatter};

/// A 32-byte content hash (Blake3)
///
/// Immutable and cheap to clone (Copy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Compute Blake3 hash of arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        Self::new(*hash.as_bytes())
    }

    /// Fingerprint of a module's source text
    #[inline]
    #[must_use]
    pub fn of_text(text: &str) -> Self {
        Self::compute(text.as_bytes())
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_same_fingerprint() {
        let a = ContentHash::of_text("Private count As Long\n");
        let b = ContentHash::of_text("Private count As Long\n");
        assert_eq!(a, b);
    }

    #[test]
    fn edited_text_changes_fingerprint() {
        let a = ContentHash::of_text("Private count As Long\n");
        let b = ContentHash::of_text("Private count1 As Long\n");
        assert_ne!(a, b);
    }

    #[test]
    fn short_is_sixteen_hex_chars() {
        let hash = ContentHash::of_text("x");
        assert_eq!(hash.short().len(), 16);
        assert!(hash.to_string().starts_with(&hash.short()));
    }
}
