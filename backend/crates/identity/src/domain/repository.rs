//! Credential Store Traits
//!
//! Persistence boundary over the two relations the core needs. Each read
//! returns zero or one row; each write either succeeds or reports a
//! [`StoreError`], with uniqueness violations distinguishable through
//! [`StoreError::UniqueViolation`].
//!
//! Uniqueness of `username` and of `(provider, subject)` is enforced by the
//! store itself, so concurrent identical inserts cannot both succeed.

use crate::domain::entity::{federated_credential::FederatedCredential, user::User};
use crate::domain::value_object::{Provider, Subject, UserId, Username};
use crate::error::StoreResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Find user by ID
    async fn find_user_by_id(&self, user_id: &UserId) -> StoreResult<Option<User>>;

    /// Find user by username (exact match)
    async fn find_user_by_username(&self, username: &Username) -> StoreResult<Option<User>>;

    /// Insert a new user
    ///
    /// Fails with `UniqueViolation(Username)` if the username exists.
    async fn insert_user(&self, user: &User) -> StoreResult<()>;

    /// Remove a user that was inserted by an unfinished federated
    /// provisioning. Returns whether a row was removed.
    async fn delete_user(&self, user_id: &UserId) -> StoreResult<bool>;
}

/// Federated credential repository trait
#[trait_variant::make(FederatedCredentialRepository: Send)]
pub trait LocalFederatedCredentialRepository {
    /// Find the credential for an external identity
    async fn find_federated_credential(
        &self,
        provider: Provider,
        subject: &Subject,
    ) -> StoreResult<Option<FederatedCredential>>;

    /// Insert a new credential
    ///
    /// Fails with `UniqueViolation(ProviderSubject)` if the pair exists.
    async fn insert_federated_credential(&self, credential: &FederatedCredential)
    -> StoreResult<()>;
}
