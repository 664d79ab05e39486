use bcrypt::{hash, verify};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Hash a password with bcrypt on the blocking pool.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || hash(password, cost).map_err(|e| PasswordError::Hashing(e.to_string())))
        .await
        .map_err(|e| PasswordError::Hashing(format!("Task join error: {}", e)))?
}

/// Check a password against a stored bcrypt hash.
pub async fn verify_password(password: &str, hashed: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let hashed = hashed.to_string();

    tokio::task::spawn_blocking(move || verify(password, &hashed).map_err(|e| PasswordError::Hashing(e.to_string())))
        .await
        .map_err(|e| PasswordError::Hashing(format!("Task join error: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn verifies_only_the_original_password() {
        let hashed = hash_password("password1", 4).await.unwrap();

        assert_ne!(hashed, "password1");
        assert!(verify_password("password1", &hashed).await.unwrap());
        assert!(!verify_password("password2", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        assert!(verify_password("password1", "not-a-bcrypt-hash").await.is_err());
    }
}
