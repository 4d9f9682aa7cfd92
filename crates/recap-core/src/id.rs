//! Content fingerprinting utilities.

use sha2::{Digest, Sha256};

/// Generate a SHA256 hash of the input, hex encoded.
pub fn sha256(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate a short hash (first 16 characters of SHA256).
pub fn short_hash(input: &str) -> String {
    sha256(input)[..16].to_string()
}
