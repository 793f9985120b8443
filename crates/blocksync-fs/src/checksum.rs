//! Content fingerprints
//!
//! Sync reports carry a fingerprint of the document before and after a run,
//! so CI can tell whether a file changed without keeping both copies.

use std::fmt;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

const ALGORITHM: &str = "sha256";

/// SHA-256 of some text, rendered as `sha256:<hex>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum(String);

impl Checksum {
    pub fn of(content: &str) -> Self {
        let digest = Sha256::digest(content.as_bytes());
        Self(format!("{}:{:x}", ALGORITHM, digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The hex digest without the algorithm prefix.
    pub fn hex(&self) -> &str {
        &self.0[ALGORITHM.len() + 1..]
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Checksum {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        let checksum = Checksum::of("");
        assert_eq!(
            checksum.hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert!(checksum.as_str().starts_with("sha256:"));
    }

    #[test]
    fn test_line_endings_matter() {
        assert_ne!(Checksum::of("a\nb\n"), Checksum::of("a\r\nb\r\n"));
        assert_eq!(Checksum::of("same"), Checksum::of("same"));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Checksum::of("")).unwrap();
        assert!(json.starts_with("\"sha256:e3b0c442"));
    }
}
