use sha2::{Digest, Sha256};

pub mod parser;
pub mod store;

/// Hex-encoded sha256 digest of the input. Used for deterministic vector
/// record IDs so re-indexing unchanged content overwrites instead of
/// duplicating.
pub fn sha256(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}
