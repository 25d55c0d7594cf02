//! Argon2 credential hashing.

use crate::errors::{Error, Result};
use argon2::{
    Argon2,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
};
use rand::rngs::OsRng;
use tokio::task;

/// Hashes a password into a self-describing PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::PasswordHash {
            message: e.to_string(),
        })
}

/// Checks a password against a stored PHC string.
///
/// Returns `Ok(false)` on a mismatch; only a malformed stored hash is an error.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| Error::PasswordHash {
        message: e.to_string(),
    })?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(e) => Err(Error::PasswordHash {
            message: e.to_string(),
        }),
    }
}

/// Runs [`hash_password`] on the blocking thread pool.
pub async fn hash_password_blocking(password: String) -> Result<String> {
    task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| Error::PasswordHash {
            message: format!("Failed to execute hashing task: {e}"),
        })?
}

/// Runs [`verify_password`] on the blocking thread pool.
pub async fn verify_password_blocking(password: String, stored_hash: String) -> Result<bool> {
    task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| Error::PasswordHash {
            message: format!("Failed to execute verification task: {e}"),
        })?
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let first = hash_password("secret").unwrap();
        let second = hash_password("secret").unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_blocking_wrappers_match_sync_functions() {
        let hash = hash_password_blocking("correct horse".to_string())
            .await
            .unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(
            verify_password_blocking("correct horse".to_string(), hash.clone())
                .await
                .unwrap()
        );
        assert!(
            !verify_password_blocking("wrong".to_string(), hash)
                .await
                .unwrap()
        );
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("secret", "not-a-phc-string"),
            Err(Error::PasswordHash { .. })
        ));
    }
}
