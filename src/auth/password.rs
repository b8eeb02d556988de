//! Password hashing for the username/password sign-in variant

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of the password.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    hash_password(password) == hash
}
