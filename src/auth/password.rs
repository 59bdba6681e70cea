//! Donor credentials: the minimum-length rule for new passwords and argon2
//! storage of the result.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::http::StatusCode;
use rand::rngs::OsRng;
use thiserror::Error;
use tracing::error;

use crate::store::User;

/// Counted in characters, not bytes.
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    TooShort,
    #[error("password hashing failed: {0}")]
    Hash(String),
}

impl From<PasswordError> for (StatusCode, String) {
    fn from(err: PasswordError) -> Self {
        let status = match err {
            PasswordError::TooShort => StatusCode::BAD_REQUEST,
            PasswordError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, err.to_string())
    }
}

/// Turns a registrant's chosen password into the PHC string the store keeps.
pub fn hash_new_password(plain: &str) -> Result<String, PasswordError> {
    if plain.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort);
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            PasswordError::Hash(e.to_string())
        })
}

/// Checks a login attempt against the donor's stored hash.
///
/// A stored value that is not a PHC string never matches.
pub fn credentials_match(user: &User, attempt: &str) -> bool {
    match PasswordHash::new(&user.password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(attempt.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            error!(user_id = user.id, error = %e, "stored password hash is unreadable");
            false
        }
    }
}
