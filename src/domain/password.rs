//! Password value object - Domain layer password handling.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use crate::errors::{AppError, AppResult};

/// Password value object that handles hashing and verification.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Create a new password by hashing the plain text.
    ///
    /// # Errors
    /// Returns a parameters error if the length is outside 6..=22 characters.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        let len = plain_text.chars().count() as u64;
        if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len) {
            return Err(AppError::parameters(format!(
                "Password must be between {} and {} characters",
                MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
            )));
        }

        let hash = Self::hash(plain_text)?;
        Ok(Self { hash })
    }

    /// Create a Password from an existing hash (from database).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        Self::verify_hash(plain_text, &self.hash).unwrap_or(false)
    }

    fn hash(plain_text: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify_hash(plain_text: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid hash format: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let password = Password::new("Secure_123").unwrap();

        assert!(password.verify("Secure_123"));
        assert!(!password.verify("Wrong_123"));
    }

    #[test]
    fn test_password_from_hash() {
        let hash = Password::new("abc123").unwrap().into_string();

        let restored = Password::from_hash(hash);
        assert!(restored.verify("abc123"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let pass1 = Password::new("same#pass").unwrap();
        let pass2 = Password::new("same#pass").unwrap();

        assert_ne!(pass1.as_str(), pass2.as_str());
        assert!(pass1.verify("same#pass"));
        assert!(pass2.verify("same#pass"));
    }

    #[test]
    fn test_length_bounds() {
        assert!(Password::new("12345").is_err());
        assert!(Password::new("123456").is_ok());
        assert!(Password::new(&"a".repeat(22)).is_ok());
        assert!(Password::new(&"a".repeat(23)).is_err());
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!Password::from_hash("not-a-phc-string".to_string()).verify("anything"));
    }

    #[test]
    fn test_debug_is_redacted() {
        let password = Password::new("abc123").unwrap();
        assert!(format!("{:?}", password).contains("[REDACTED]"));
    }
}
