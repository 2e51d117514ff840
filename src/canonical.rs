//! Canonical serialization and digest helpers.
//!
//! ## Determinism Guarantees
//!
//! - Stable field order: struct fields serialize in declaration order
//! - No HashMap in exported data: maps are BTreeMap, sets are sorted Vecs
//! - Digests are SHA-256 over UTF-8 bytes, lowercase hex

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Serialize a value to canonical JSON bytes.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(value)
}

/// SHA-256 of `bytes` as a 64-character lowercase hex string.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_sha256_known_values() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex(b"Hello World"),
            "a591a6d40bf420404a011733cfb7b190d62c65bf0bcda32b57b277d9ad9f146e"
        );
    }

    #[test]
    fn test_canonical_bytes_sorted_maps() {
        let mut first = BTreeMap::new();
        first.insert("b", 2);
        first.insert("a", 1);

        let mut second = BTreeMap::new();
        second.insert("a", 1);
        second.insert("b", 2);

        let bytes = to_canonical_bytes(&first).unwrap();
        assert_eq!(bytes, to_canonical_bytes(&second).unwrap());
        assert_eq!(bytes, br#"{"a":1,"b":2}"#.to_vec());
    }
}
