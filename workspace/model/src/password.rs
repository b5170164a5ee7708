//! One-way password storage.
//!
//! Passwords are stored as Argon2id PHC strings. Accounts created without a
//! password get an unusable marker that no input ever verifies against.

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Argon2,
};
use tracing::{trace, warn};

/// Prefix marking a stored password that can never be verified.
pub const UNUSABLE_PASSWORD_PREFIX: &str = "!";

/// Hashes `raw` into a PHC string with a fresh random salt.
pub fn make_password(raw: &str) -> Result<String, HashError> {
    trace!("Hashing password");
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(raw.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Returns a random value that marks the password as unusable.
pub fn make_unusable_password() -> String {
    let salt = SaltString::generate(&mut OsRng);
    format!("{}{}", UNUSABLE_PASSWORD_PREFIX, salt.as_str())
}

/// Returns false for unusable markers and anything that is not a PHC string.
pub fn is_password_usable(encoded: &str) -> bool {
    !encoded.starts_with(UNUSABLE_PASSWORD_PREFIX) && PasswordHash::new(encoded).is_ok()
}

/// Checks `raw` against a stored PHC string.
pub fn check_password(raw: &str, encoded: &str) -> bool {
    if encoded.starts_with(UNUSABLE_PASSWORD_PREFIX) {
        return false;
    }

    let parsed = match PasswordHash::new(encoded) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Stored password is not a valid hash: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(raw.as_bytes(), &parsed)
        .is_ok()
}
