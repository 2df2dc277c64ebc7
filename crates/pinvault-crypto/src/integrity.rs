//! SHA-256 content hashes recorded for every upload

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// True if `data` hashes to `expected` (hex, case-insensitive).
pub fn verify_integrity(data: &[u8], expected: &str) -> bool {
    sha256_hex(data).eq_ignore_ascii_case(expected.trim())
}
