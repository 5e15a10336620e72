//! User Entity
//!
//! The internal identity every successful authentication resolves to.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{Subject, UserId, UserPassword, Username};

/// User entity
///
/// `password_hash` is `None` for accounts created by a federated login.
/// Nothing in this crate mutates a user after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Unique handle (chosen, or the provider subject)
    pub username: Username,
    /// bcrypt hash, absent for federated-only accounts
    pub password_hash: Option<UserPassword>,
    /// Free-text display name
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Account created by registration
    pub fn new_local(username: Username, password_hash: UserPassword) -> Self {
        Self {
            user_id: UserId::new(),
            username,
            password_hash: Some(password_hash),
            display_name: None,
            created_at: Utc::now(),
        }
    }

    /// Account created by a first federated login
    ///
    /// The subject doubles as the username.
    pub fn new_federated(subject: &Subject, display_name: Option<String>) -> Self {
        Self {
            user_id: UserId::new(),
            username: Username::from(subject),
            password_hash: None,
            display_name,
            created_at: Utc::now(),
        }
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}
