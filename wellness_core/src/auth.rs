//! Local credential hashing.
//!
//! Passwords are stored as Argon2id PHC strings inside the user document.
//! This keeps plaintext off disk but is not a security boundary: anyone who
//! can read the data directory can read or replace the documents.

use crate::{Error, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password for storage
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Other(format!("Password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string
///
/// An unparseable stored hash counts as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Stored password hash is unreadable: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
