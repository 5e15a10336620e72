//! User Password Value Object
//!
//! Domain wrappers around `platform::password`:
//! - [`RawPassword`] - password as typed by the user, zeroized on drop
//! - [`UserPassword`] - bcrypt hash as stored in the `users.password` column
//!
//! ## Usage
//! ```rust
//! use identity::domain::value_object::user_password::RawPassword;
//!
//! let raw = RawPassword::new("secret123".to_string()).unwrap();
//! let stored = raw.hash(4).unwrap();
//! assert!(stored.verify(&raw).unwrap());
//! ```

use platform::password::{
    ClearTextPassword, HashedPassword, PasswordHashError, PasswordPolicyError,
};
use std::fmt;

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Rejects only the empty string
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        ClearTextPassword::new(raw).map(Self)
    }

    /// Hash for storage (bcrypt, fresh salt)
    pub fn hash(&self, cost: u32) -> Result<UserPassword, PasswordHashError> {
        self.0.hash(cost).map(UserPassword)
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Stored password hash
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Load from the database without validation
    pub fn from_db(hash: impl Into<String>) -> Self {
        Self(HashedPassword::from_db(hash))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// `Err(MalformedHash)` when the stored value is not a bcrypt string
    pub fn verify(&self, raw: &RawPassword) -> Result<bool, PasswordHashError> {
        self.0.verify(&raw.0)
    }

    pub fn cost(&self) -> Option<u32> {
        self.0.cost()
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserPassword").field(&"[HASH]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::MIN_COST;

    #[test]
    fn test_empty_rejected() {
        assert_eq!(
            RawPassword::new(String::new()).unwrap_err(),
            PasswordPolicyError::Empty
        );
    }

    #[test]
    fn test_hash_then_verify() {
        let raw = RawPassword::new("secret123".to_string()).unwrap();
        let stored = raw.hash(MIN_COST).unwrap();

        let reloaded = UserPassword::from_db(stored.as_str());
        assert!(reloaded.verify(&raw).unwrap());

        let wrong = RawPassword::new("secret124".to_string()).unwrap();
        assert!(!reloaded.verify(&wrong).unwrap());
    }

    #[test]
    fn test_corrupt_row_surfaces_malformed() {
        let raw = RawPassword::new("secret123".to_string()).unwrap();
        let stored = UserPassword::from_db("$2b$12$tooshort");
        assert_eq!(stored.verify(&raw), Err(PasswordHashError::MalformedHash));
    }
}
