//! Session token generation and hashing.

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// Session tokens carry 256 bits of entropy.
const SESSION_TOKEN_BYTES: usize = 32;

/// Generate a new random session token (hex encoded).
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a secret for database lookups (session tokens).
/// Uses SHA-256 with application salt, returns lowercase hex string.
pub fn hash_secret(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"survey-unlock-v1:");
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
