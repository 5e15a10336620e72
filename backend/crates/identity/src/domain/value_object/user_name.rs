//! Username and Subject Value Objects
//!
//! A username is the unique handle of a [`User`](crate::domain::entity::user::User).
//! It is either chosen at registration or, for accounts created by a first
//! federated login, the provider-issued [`Subject`].
//!
//! No normalization or character policy is applied: the stored value is
//! exactly what was submitted, and the only requirement is non-empty.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("Username must not be empty")]
    EmptyUsername,
    #[error("Provider subject must not be empty")]
    EmptySubject,
}

// ============================================================================
// Username
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    pub fn new(raw: impl Into<String>) -> Result<Self, IdentifierError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(IdentifierError::EmptyUsername);
        }
        Ok(Self(raw))
    }

    /// Trusted value read back from the store
    pub fn from_db(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&Subject> for Username {
    fn from(subject: &Subject) -> Self {
        Self(subject.as_str().to_string())
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Subject
// ============================================================================

/// Stable identifier a provider assigns to an external identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(String);

impl Subject {
    pub fn new(raw: impl Into<String>) -> Result<Self, IdentifierError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(IdentifierError::EmptySubject);
        }
        Ok(Self(raw))
    }

    pub fn from_db(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
