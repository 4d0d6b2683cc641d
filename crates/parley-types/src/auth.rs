use sha2::{Digest, Sha256};

/// One-way hash used for password storage and comparison (SHA-256, lowercase hex).
pub fn hash_password(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    hex::encode(hasher.finalize())
}
