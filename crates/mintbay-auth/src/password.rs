//! Argon2id password hashing (PHC string format).

use std::sync::OnceLock;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use mintbay_core::AppError;

/// Hash a plaintext password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::CredentialError(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC string.
///
/// A malformed stored hash is a server-side data problem, not a wrong
/// password, so it surfaces as an error rather than `false`.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AppError> {
    let parsed =
        PasswordHash::new(stored).map_err(|e| AppError::CredentialError(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Verify a password when the account may not exist.
///
/// When `stored` is `None` the password is verified against a fixed dummy
/// hash and the result discarded, so the login path takes the same time
/// whether or not the email matched an account.
pub fn verify_password_timing_safe(password: &str, stored: Option<&str>) -> Result<bool, AppError> {
    match stored {
        Some(hash) => verify_password(password, hash),
        None => {
            let _ = verify_password(password, dummy_hash());
            Ok(false)
        }
    }
}

fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| {
        hash_password("mintbay-timing-pad").expect("default Argon2 parameters are valid")
    })
}
