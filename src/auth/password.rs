/// Operator password hashing (Argon2id, PHC string format)
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tokio::task;

use crate::error::{ApiError, ApiResult};

/// Hash a password into a PHC string
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))
}

/// Compare a password with a stored hash.
///
/// A stored value that is not a PHC string (e.g. a legacy plaintext column)
/// never matches.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::warn!("Stored credential is not a valid password hash");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// `verify_password` on the blocking pool; Argon2 is CPU-heavy
pub async fn verify_password_blocking(password: &str, stored_hash: &str) -> ApiResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();

    task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::Internal(format!("Password verification task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_plaintext_column_never_matches() {
        assert!(!verify_password("secret", "secret"));
    }

    #[tokio::test]
    async fn test_blocking_verify() {
        let hash = hash_password("pw").unwrap();
        assert!(verify_password_blocking("pw", &hash).await.unwrap());
    }
}
