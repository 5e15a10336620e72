//! Federated Identity Resolver
//!
//! Maps a verified `(provider, subject)` assertion to an internal user,
//! provisioning one on first login.
//!
//! Provisioning is two writes (user, then credential). When the credential
//! insert fails the new user is deleted again; if that delete fails too the
//! caller gets [`ResolveFailure::OrphanedUser`]. Uniqueness violations mean a
//! concurrent request for the same identity is provisioning it, so the
//! resolver looks again instead of failing.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entity::{federated_credential::FederatedCredential, user::User};
use crate::domain::repository::{FederatedCredentialRepository, UserRepository};
use crate::domain::value_object::{Provider, Subject, UserId, Username};
use crate::error::{ResolveFailure, StoreError, UniqueConstraint};

/// Lookups before a held username is reported as a conflict
pub const MAX_RESOLVE_ATTEMPTS: u32 = 3;

const RESOLVE_BACKOFF: Duration = Duration::from_millis(20);

pub struct FederatedResolver<S>
where
    S: UserRepository + FederatedCredentialRepository + Send + Sync + 'static,
{
    store: Arc<S>,
}

impl<S> FederatedResolver<S>
where
    S: UserRepository + FederatedCredentialRepository + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Resolve or provision the user behind an external identity
    ///
    /// `display_name` is only used when a user is created.
    pub async fn resolve(
        &self,
        provider: Provider,
        subject: &str,
        display_name: Option<String>,
    ) -> Result<User, ResolveFailure> {
        let subject = Subject::new(subject)?;

        for attempt in 1..=MAX_RESOLVE_ATTEMPTS {
            if let Some(user) = self
                .try_resolve(provider, &subject, display_name.clone())
                .await?
            {
                return Ok(user);
            }

            tracing::debug!(%provider, %subject, attempt, "Identity contended, resolving again");
            if attempt < MAX_RESOLVE_ATTEMPTS {
                tokio::time::sleep(RESOLVE_BACKOFF * attempt).await;
            }
        }

        if let Some(user) = self.find_linked_user(provider, &subject).await? {
            return Ok(user);
        }

        tracing::warn!(%provider, %subject, "Username already held by another account");
        Err(ResolveFailure::UsernameConflict {
            username: Username::from(&subject),
        })
    }

    /// One lookup-or-provision pass
    ///
    /// `Ok(None)` when a uniqueness violation says another writer got there
    /// first.
    async fn try_resolve(
        &self,
        provider: Provider,
        subject: &Subject,
        display_name: Option<String>,
    ) -> Result<Option<User>, ResolveFailure> {
        if let Some(user) = self.find_linked_user(provider, subject).await? {
            return Ok(Some(user));
        }

        let user = User::new_federated(subject, display_name);
        match self.store.insert_user(&user).await {
            Ok(()) => {}
            Err(StoreError::UniqueViolation(UniqueConstraint::Username)) => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        let credential = FederatedCredential::new(user.user_id, provider, subject.clone());
        match self.store.insert_federated_credential(&credential).await {
            Ok(()) => {
                tracing::info!(user_id = %user.user_id, %provider, "Provisioned federated user");
                Ok(Some(user))
            }
            Err(cause @ StoreError::UniqueViolation(UniqueConstraint::ProviderSubject)) => {
                self.remove_unlinked_user(user.user_id, cause).await?;
                Ok(None)
            }
            Err(cause) => {
                self.remove_unlinked_user(user.user_id, cause.clone()).await?;
                Err(ResolveFailure::Store(cause))
            }
        }
    }

    async fn find_linked_user(
        &self,
        provider: Provider,
        subject: &Subject,
    ) -> Result<Option<User>, ResolveFailure> {
        let Some(credential) = self
            .store
            .find_federated_credential(provider, subject)
            .await?
        else {
            return Ok(None);
        };

        match self.store.find_user_by_id(&credential.user_id).await? {
            Some(user) => Ok(Some(user)),
            None => {
                tracing::error!(
                    %provider,
                    %subject,
                    user_id = %credential.user_id,
                    "Federated credential references a missing user"
                );
                Err(ResolveFailure::DanglingCredential {
                    provider,
                    subject: subject.clone(),
                    user_id: credential.user_id,
                })
            }
        }
    }

    /// Undo the user insert of a provisioning whose credential insert failed
    async fn remove_unlinked_user(
        &self,
        user_id: UserId,
        cause: StoreError,
    ) -> Result<(), ResolveFailure> {
        match self.store.delete_user(&user_id).await {
            Ok(_) => {
                tracing::warn!(%user_id, error = %cause, "Credential insert failed, user removed");
                Ok(())
            }
            Err(cleanup) => {
                tracing::error!(
                    %user_id,
                    error = %cause,
                    cleanup_error = %cleanup,
                    "Credential insert failed and user could not be removed"
                );
                Err(ResolveFailure::OrphanedUser {
                    user_id,
                    cause,
                    cleanup,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::InMemoryCredentialStore;
    use platform::password::MIN_COST;

    fn resolver(store: &Arc<InMemoryCredentialStore>) -> FederatedResolver<InMemoryCredentialStore> {
        FederatedResolver::new(store.clone())
    }

    #[tokio::test]
    async fn test_first_login_provisions_user_and_credential() {
        let store = Arc::new(InMemoryCredentialStore::new());

        let user = resolver(&store)
            .resolve(Provider::Google, "ext-42", Some("Alice G.".to_string()))
            .await
            .unwrap();

        assert_eq!(user.username.as_str(), "ext-42");
        assert_eq!(user.display_name.as_deref(), Some("Alice G."));
        assert!(!user.has_password());

        let subject = Subject::new("ext-42").unwrap();
        let credential = store
            .find_federated_credential(Provider::Google, &subject)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credential.user_id, user.user_id);
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let resolver = resolver(&store);

        let first = resolver
            .resolve(Provider::Google, "ext-42", Some("Alice G.".to_string()))
            .await
            .unwrap();
        let second = resolver
            .resolve(Provider::Google, "ext-42", Some("Someone Else".to_string()))
            .await
            .unwrap();

        assert_eq!(first.user_id, second.user_id);
        assert_eq!(second.display_name.as_deref(), Some("Alice G."));
        assert_eq!(store.count_credentials().await, 1);
        assert_eq!(store.count_users().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_logins_share_one_user() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let a = resolver(&store);
        let b = resolver(&store);

        let (first, second) = tokio::join!(
            a.resolve(Provider::Facebook, "fb-7", None),
            b.resolve(Provider::Facebook, "fb-7", None),
        );

        assert_eq!(first.unwrap().user_id, second.unwrap().user_id);
        assert_eq!(store.count_users().await, 1);
        assert_eq!(store.count_credentials().await, 1);
    }

    #[tokio::test]
    async fn test_credential_lost_to_concurrent_link_resolves_to_winner() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let subject = Subject::new("ext-42").unwrap();

        let winner = User::new_federated(&Subject::new("ext-42-first").unwrap(), None);
        store.insert_user(&winner).await.unwrap();
        store
            .race_next_credential_insert(FederatedCredential::new(
                winner.user_id,
                Provider::Google,
                subject.clone(),
            ))
            .await;

        let user = resolver(&store)
            .resolve(Provider::Google, "ext-42", None)
            .await
            .unwrap();

        assert_eq!(user.user_id, winner.user_id);
        // the user provisioned for the losing insert is gone again
        assert_eq!(store.count_users_named("ext-42").await, 0);
        assert_eq!(store.count_users().await, 1);
        assert_eq!(store.count_credentials().await, 1);
    }

    #[tokio::test]
    async fn test_dangling_credential() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let missing = UserId::new();
        store
            .insert_federated_credential(&FederatedCredential::new(
                missing,
                Provider::Twitter,
                Subject::new("tw-1").unwrap(),
            ))
            .await
            .unwrap();

        let err = resolver(&store)
            .resolve(Provider::Twitter, "tw-1", None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveFailure::DanglingCredential { user_id, .. } if user_id == missing
        ));
        assert_eq!(store.count_users().await, 0);
    }

    #[tokio::test]
    async fn test_credential_failure_removes_new_user() {
        let store = Arc::new(InMemoryCredentialStore::new());
        store.fail_credential_inserts(true);

        let err = resolver(&store)
            .resolve(Provider::Google, "ext-42", None)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveFailure::Store(StoreError::Backend(_))));
        assert_eq!(store.count_users().await, 0);
        assert_eq!(store.count_credentials().await, 0);
    }

    #[tokio::test]
    async fn test_failed_cleanup_reports_orphan() {
        let store = Arc::new(InMemoryCredentialStore::new());
        store.fail_credential_inserts(true);
        store.fail_user_deletes(true);

        let err = resolver(&store)
            .resolve(Provider::Google, "ext-42", None)
            .await
            .unwrap_err();

        let ResolveFailure::OrphanedUser { user_id, .. } = err else {
            panic!("expected OrphanedUser");
        };
        assert!(store.find_user_by_id(&user_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_local_account_holding_subject_conflicts() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let local = crate::application::local::LocalAuthenticator::new(
            store.clone(),
            crate::application::password::PasswordVerifier::new(MIN_COST),
        );
        local.register("ext-42", "secret123".to_string()).await.unwrap();

        let err = resolver(&store)
            .resolve(Provider::Google, "ext-42", None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ResolveFailure::UsernameConflict { ref username } if username.as_str() == "ext-42"
        ));
        assert_eq!(store.count_users().await, 1);
        assert_eq!(store.count_credentials().await, 0);
    }

    #[tokio::test]
    async fn test_same_subject_other_provider_conflicts() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let resolver = resolver(&store);

        resolver.resolve(Provider::Google, "42", None).await.unwrap();
        let err = resolver.resolve(Provider::Twitter, "42", None).await.unwrap_err();

        assert!(matches!(err, ResolveFailure::UsernameConflict { .. }));
    }

    #[tokio::test]
    async fn test_empty_subject_rejected() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let err = resolver(&store)
            .resolve(Provider::Google, "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveFailure::InvalidSubject(_)));
    }
}
