//! Checksum validation for migrations

use sha2::{Digest, Sha256};

/// Compute the SHA-256 checksum of migration SQL as lowercase hex
pub fn compute_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
