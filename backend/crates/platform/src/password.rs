//! Password Hashing and Verification
//!
//! bcrypt-based password handling:
//! - Salted, adaptive-cost hashing (work factor 12 by default)
//! - Zeroization of clear text passwords
//! - Constant-time comparison (delegated to bcrypt)
//!
//! A stored hash that cannot be parsed is reported as
//! [`PasswordHashError::MalformedHash`] instead of being folded into a
//! plain "does not match", so callers can log it.

use std::fmt;

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Constants
// ============================================================================

/// Work factor used for every stored password
pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Lowest cost bcrypt accepts (tests only)
pub const MIN_COST: u32 = 4;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must not be empty")]
    Empty,
}

/// Password hashing/verification errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Stored hash is not a valid bcrypt string
    #[error("Stored password hash is malformed")]
    MalformedHash,
}

impl From<bcrypt::BcryptError> for PasswordHashError {
    fn from(err: bcrypt::BcryptError) -> Self {
        match err {
            bcrypt::BcryptError::InvalidHash(_)
            | bcrypt::BcryptError::InvalidPrefix(_)
            | bcrypt::BcryptError::InvalidCost(_)
            | bcrypt::BcryptError::InvalidBase64(_) => PasswordHashError::MalformedHash,
            other => PasswordHashError::HashingFailed(other.to_string()),
        }
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password, erased from memory on drop
///
/// Not `Clone`, and `Debug` output is redacted.
///
/// ```rust
/// use platform::password::{ClearTextPassword, MIN_COST};
///
/// let password = ClearTextPassword::new("secret123".to_string()).unwrap();
/// let hashed = password.hash(MIN_COST).unwrap();
/// assert!(hashed.verify(&password).unwrap());
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// The only policy is "not empty"; whitespace is kept as typed.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        if raw.is_empty() {
            return Err(PasswordPolicyError::Empty);
        }
        Ok(Self(raw))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Hash with a fresh random salt at the given cost
    pub fn hash(&self, cost: u32) -> Result<HashedPassword, PasswordHashError> {
        let hash = bcrypt::hash(self.as_bytes(), cost)?;
        Ok(HashedPassword { hash })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// bcrypt hash string (`$2b$12$...`)
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Wrap a stored hash as-is
    ///
    /// No validation here: a corrupt row must still load so that the
    /// failure shows up at verification time as [`PasswordHashError::MalformedHash`].
    pub fn from_db(s: impl Into<String>) -> Self {
        Self { hash: s.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Work factor encoded in the hash
    pub fn cost(&self) -> Option<u32> {
        self.hash
            .parse::<bcrypt::HashParts>()
            .ok()
            .map(|parts| parts.get_cost())
    }

    /// Verify a password against this hash
    ///
    /// `Ok(false)` means a well-formed hash that does not match. A cost or
    /// salt read from the stored string that bcrypt refuses is a corrupt
    /// hash, not a hashing fault.
    pub fn verify(&self, password: &ClearTextPassword) -> Result<bool, PasswordHashError> {
        bcrypt::verify(password.as_bytes(), &self.hash).map_err(|err| match err {
            bcrypt::BcryptError::CostNotAllowed(_) | bcrypt::BcryptError::InvalidSaltLen(_) => {
                PasswordHashError::MalformedHash
            }
            other => other.into(),
        })
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn password(raw: &str) -> ClearTextPassword {
        ClearTextPassword::new(raw.to_string()).unwrap()
    }

    #[test]
    fn test_empty_password_rejected() {
        let result = ClearTextPassword::new(String::new());
        assert!(matches!(result, Err(PasswordPolicyError::Empty)));
    }

    #[test]
    fn test_short_password_accepted() {
        // no length policy beyond non-empty
        assert!(ClearTextPassword::new("a".to_string()).is_ok());
        assert!(ClearTextPassword::new(" ".to_string()).is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let hashed = password("secret123").hash(MIN_COST).unwrap();

        assert!(hashed.verify(&password("secret123")).unwrap());
        assert!(!hashed.verify(&password("wrong")).unwrap());
    }

    #[test]
    fn test_hash_is_salted() {
        let p = password("secret123");
        let first = p.hash(MIN_COST).unwrap();
        let second = p.hash(MIN_COST).unwrap();
        assert_ne!(first.as_str(), second.as_str());
    }

    #[test]
    fn test_default_cost_is_twelve() {
        assert_eq!(DEFAULT_COST, 12);
    }

    #[test]
    fn test_cost_is_encoded() {
        let hashed = password("secret123").hash(MIN_COST).unwrap();
        assert_eq!(hashed.cost(), Some(MIN_COST));
        assert!(hashed.as_str().starts_with("$2b$04$"));
    }

    #[test]
    fn test_malformed_hash_is_distinguishable() {
        let stored = HashedPassword::from_db("not-a-bcrypt-hash");
        assert_eq!(
            stored.verify(&password("secret123")),
            Err(PasswordHashError::MalformedHash)
        );
        assert_eq!(stored.cost(), None);
    }

    #[test]
    fn test_out_of_range_stored_cost_is_malformed() {
        let valid = password("secret123").hash(MIN_COST).unwrap();

        for cost in ["$99$", "$03$"] {
            let corrupt = HashedPassword::from_db(valid.as_str().replacen("$04$", cost, 1));
            assert_eq!(
                corrupt.verify(&password("secret123")),
                Err(PasswordHashError::MalformedHash),
                "cost {cost}"
            );
        }
    }

    #[test]
    fn test_debug_redaction() {
        let p = password("secret123");
        let debug_output = format!("{:?}", p);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret123"));

        let hashed = p.hash(MIN_COST).unwrap();
        assert!(!format!("{:?}", hashed).contains("$2"));
    }
}
