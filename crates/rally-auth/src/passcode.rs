//! Argon2id hashing for join and facilitator codes.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use rally_core::error::AppError;

/// Hashes and verifies session passcodes using Argon2id.
#[derive(Debug, Clone, Default)]
pub struct PasscodeHasher;

impl PasscodeHasher {
    /// Creates a new hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hashes a plaintext code with a random salt.
    pub fn hash(&self, code: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(code.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Passcode hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext code against a stored hash.
    ///
    /// Returns `Ok(true)` if the code matches, `Ok(false)` if not.
    pub fn verify(&self, code: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid passcode hash format: {e}")))?;

        match Argon2::default().verify_password(code.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Passcode verification failed: {e}"
            ))),
        }
    }
}
