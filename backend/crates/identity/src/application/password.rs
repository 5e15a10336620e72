//! Password Verifier
//!
//! Runs bcrypt on the blocking pool so hashing cost never stalls the async
//! workers. Cloneable and safe to share between requests.

use platform::password::PasswordHashError;

use crate::domain::value_object::{RawPassword, UserPassword};

#[derive(Debug, Clone, Copy)]
pub struct PasswordVerifier {
    cost: u32,
}

impl PasswordVerifier {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Salted bcrypt hash of `password`
    pub async fn hash(&self, password: RawPassword) -> Result<UserPassword, PasswordHashError> {
        let cost = self.cost;
        tokio::task::spawn_blocking(move || password.hash(cost))
            .await
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?
    }

    /// Compare `password` against a stored hash
    ///
    /// `Ok(false)` on mismatch, `Err(MalformedHash)` when the stored value is
    /// not a bcrypt string.
    pub async fn verify(
        &self,
        password: RawPassword,
        stored: UserPassword,
    ) -> Result<bool, PasswordHashError> {
        tokio::task::spawn_blocking(move || stored.verify(&password))
            .await
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?
    }
}
