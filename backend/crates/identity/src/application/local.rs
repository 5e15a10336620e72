//! Local Credential Authenticator
//!
//! Username/password login and registration against the credential store.

use std::sync::Arc;

use platform::password::PasswordHashError;

use crate::application::password::PasswordVerifier;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{RawPassword, Username};
use crate::error::{AuthFailure, RegisterFailure, StoreError, UniqueConstraint};

pub struct LocalAuthenticator<S>
where
    S: UserRepository + Send + Sync + 'static,
{
    store: Arc<S>,
    verifier: PasswordVerifier,
}

impl<S> LocalAuthenticator<S>
where
    S: UserRepository + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>, verifier: PasswordVerifier) -> Self {
        Self { store, verifier }
    }

    /// Check a username/password pair
    ///
    /// Returns the stored user unchanged on success.
    pub async fn authenticate(&self, username: &str, password: String) -> Result<User, AuthFailure> {
        // An empty username or password can never match a stored account
        let username = Username::new(username).map_err(|_| AuthFailure::UnknownUser)?;
        let password = RawPassword::new(password).map_err(|_| AuthFailure::BadPassword)?;

        let user = self
            .store
            .find_user_by_username(&username)
            .await?
            .ok_or(AuthFailure::UnknownUser)?;

        let stored = user
            .password_hash
            .clone()
            .ok_or(AuthFailure::NoPasswordSet)?;

        match self.verifier.verify(password, stored).await {
            Ok(true) => {
                tracing::info!(user_id = %user.user_id, "Password login succeeded");
                Ok(user)
            }
            Ok(false) => Err(AuthFailure::BadPassword),
            Err(PasswordHashError::MalformedHash) => {
                tracing::error!(user_id = %user.user_id, "Stored password hash is malformed");
                Err(AuthFailure::MalformedCredentialHash)
            }
            Err(e) => Err(AuthFailure::Verifier(e.to_string())),
        }
    }

    /// Create a local account
    pub async fn register(&self, username: &str, password: String) -> Result<User, RegisterFailure> {
        let username = Username::new(username)?;
        let password = RawPassword::new(password)?;

        if self.store.find_user_by_username(&username).await?.is_some() {
            return Err(RegisterFailure::UsernameTaken);
        }

        let hash = self.verifier.hash(password).await?;
        let user = User::new_local(username, hash);

        match self.store.insert_user(&user).await {
            Ok(()) => {}
            // Lost a race with a concurrent registration
            Err(StoreError::UniqueViolation(UniqueConstraint::Username)) => {
                return Err(RegisterFailure::UsernameTaken);
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user_id = %user.user_id, "User registered");
        Ok(user)
    }
}
