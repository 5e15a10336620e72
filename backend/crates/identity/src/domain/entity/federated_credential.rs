//! Federated Credential Entity
//!
//! Links one external identity `(provider, subject)` to exactly one user.
//! Created once, at the first successful login through that provider, and
//! never updated or deleted afterwards.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{Provider, Subject, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedCredential {
    /// Owning user (referenced, not owned)
    pub user_id: UserId,
    pub provider: Provider,
    pub subject: Subject,
    pub created_at: DateTime<Utc>,
}

impl FederatedCredential {
    pub fn new(user_id: UserId, provider: Provider, subject: Subject) -> Self {
        Self {
            user_id,
            provider,
            subject,
            created_at: Utc::now(),
        }
    }
}
