//! In-Memory Credential Store
//!
//! Process-local store with the same uniqueness rules as the PostgreSQL
//! schema. Both tables sit behind one lock, so the check and the insert of a
//! write happen atomically. Used by tests and local experiments; the fault
//! switches make individual store calls fail on demand.
//!
//! The user foreign key is not enforced, so a credential may point at a
//! missing user.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use crate::domain::entity::{federated_credential::FederatedCredential, user::User};
use crate::domain::repository::{FederatedCredentialRepository, UserRepository};
use crate::domain::value_object::{Provider, Subject, UserId, Username};
use crate::error::{StoreError, StoreResult, UniqueConstraint};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    usernames: HashMap<Username, UserId>,
    credentials: HashMap<(Provider, Subject), FederatedCredential>,
    /// Written ahead of the next credential insert
    competing_credential: Option<FederatedCredential>,
}

#[derive(Default)]
pub struct InMemoryCredentialStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
    fail_credential_inserts: AtomicBool,
    fail_user_deletes: AtomicBool,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Credential inserts fail with `StoreError::Backend`
    pub fn fail_credential_inserts(&self, fail: bool) {
        self.fail_credential_inserts.store(fail, Ordering::SeqCst);
    }

    /// User deletes fail with `StoreError::Backend`
    pub fn fail_user_deletes(&self, fail: bool) {
        self.fail_user_deletes.store(fail, Ordering::SeqCst);
    }

    /// Commit `credential` right before the next credential insert runs
    ///
    /// Stands in for a concurrent writer that links the same identity
    /// between another writer's lookup and its insert.
    pub async fn race_next_credential_insert(&self, credential: FederatedCredential) {
        self.tables.write().await.competing_credential = Some(credential);
    }

    pub async fn count_users(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn count_users_named(&self, username: &str) -> usize {
        self.tables
            .read()
            .await
            .users
            .values()
            .filter(|u| u.username.as_str() == username)
            .count()
    }

    pub async fn count_credentials(&self) -> usize {
        self.tables.read().await.credentials.len()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store switched off".to_string()));
        }
        Ok(())
    }
}

impl UserRepository for InMemoryCredentialStore {
    async fn find_user_by_id(&self, user_id: &UserId) -> StoreResult<Option<User>> {
        self.check_available()?;
        Ok(self.tables.read().await.users.get(user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &Username) -> StoreResult<Option<User>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .usernames
            .get(username)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        self.check_available()?;
        let mut tables = self.tables.write().await;

        if tables.usernames.contains_key(&user.username) {
            return Err(StoreError::UniqueViolation(UniqueConstraint::Username));
        }
        if tables.users.contains_key(&user.user_id) {
            return Err(StoreError::Backend(format!("duplicate user_id {}", user.user_id)));
        }

        tables.usernames.insert(user.username.clone(), user.user_id);
        tables.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn delete_user(&self, user_id: &UserId) -> StoreResult<bool> {
        self.check_available()?;
        if self.fail_user_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("user delete failed".to_string()));
        }

        let mut tables = self.tables.write().await;
        match tables.users.remove(user_id) {
            Some(user) => {
                tables.usernames.remove(&user.username);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl FederatedCredentialRepository for InMemoryCredentialStore {
    async fn find_federated_credential(
        &self,
        provider: Provider,
        subject: &Subject,
    ) -> StoreResult<Option<FederatedCredential>> {
        self.check_available()?;
        Ok(self
            .tables
            .read()
            .await
            .credentials
            .get(&(provider, subject.clone()))
            .cloned())
    }

    async fn insert_federated_credential(
        &self,
        credential: &FederatedCredential,
    ) -> StoreResult<()> {
        self.check_available()?;
        if self.fail_credential_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("credential insert failed".to_string()));
        }

        let mut tables = self.tables.write().await;
        if let Some(competing) = tables.competing_credential.take() {
            let key = (competing.provider, competing.subject.clone());
            tables.credentials.entry(key).or_insert(competing);
        }

        let key = (credential.provider, credential.subject.clone());
        if tables.credentials.contains_key(&key) {
            return Err(StoreError::UniqueViolation(UniqueConstraint::ProviderSubject));
        }

        tables.credentials.insert(key, credential.clone());
        Ok(())
    }
}
