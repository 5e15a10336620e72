//! Authentication Orchestrator
//!
//! Single entry point for authentication events. Dispatches to the local
//! authenticator or the federated resolver and turns the resolved user into
//! a session reference. Holds no state of its own beyond its collaborators.

use std::fmt;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::federated::FederatedResolver;
use crate::application::local::LocalAuthenticator;
use crate::application::password::PasswordVerifier;
use crate::application::session::{SessionCodec, SessionRef};
use crate::domain::entity::user::User;
use crate::domain::repository::{FederatedCredentialRepository, UserRepository};
use crate::domain::value_object::Provider;
use crate::error::{AuthError, AuthResult};

/// Inbound authentication event
pub enum AuthEvent {
    LocalLogin {
        username: String,
        password: String,
    },
    LocalRegister {
        username: String,
        password: String,
    },
    /// Profile already verified by the provider handshake
    FederatedLogin {
        provider: Provider,
        subject: String,
        display_name: Option<String>,
    },
    Logout {
        session: SessionRef,
    },
}

impl fmt::Debug for AuthEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthEvent::LocalLogin { username, .. } => f
                .debug_struct("LocalLogin")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            AuthEvent::LocalRegister { username, .. } => f
                .debug_struct("LocalRegister")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            AuthEvent::FederatedLogin {
                provider,
                subject,
                display_name,
            } => f
                .debug_struct("FederatedLogin")
                .field("provider", provider)
                .field("subject", subject)
                .field("display_name", display_name)
                .finish(),
            AuthEvent::Logout { session } => {
                f.debug_struct("Logout").field("session", session).finish()
            }
        }
    }
}

#[derive(Debug)]
pub enum AuthOutcome {
    SignedIn { user: User, session: SessionRef },
    /// The transport drops the session reference; nothing is stored
    SignedOut,
}

pub struct AuthOrchestrator<S>
where
    S: UserRepository + FederatedCredentialRepository + Send + Sync + 'static,
{
    local: LocalAuthenticator<S>,
    federated: FederatedResolver<S>,
    sessions: SessionCodec<S>,
    config: Arc<AuthConfig>,
}

impl<S> AuthOrchestrator<S>
where
    S: UserRepository + FederatedCredentialRepository + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>, config: Arc<AuthConfig>) -> Self {
        let verifier = PasswordVerifier::new(config.password_cost);
        Self {
            local: LocalAuthenticator::new(store.clone(), verifier),
            federated: FederatedResolver::new(store.clone()),
            sessions: SessionCodec::new(store, config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub async fn handle(&self, event: AuthEvent) -> AuthResult<AuthOutcome> {
        match event {
            AuthEvent::LocalLogin { username, password } => {
                let user = self.local.authenticate(&username, password).await?;
                Ok(self.sign_in(user))
            }
            AuthEvent::LocalRegister { username, password } => {
                let user = self.local.register(&username, password).await?;
                Ok(self.sign_in(user))
            }
            AuthEvent::FederatedLogin {
                provider,
                subject,
                display_name,
            } => {
                if !self.config.is_provider_enabled(provider) {
                    return Err(AuthError::ProviderDisabled(provider));
                }
                let user = self
                    .federated
                    .resolve(provider, &subject, display_name)
                    .await?;
                Ok(self.sign_in(user))
            }
            AuthEvent::Logout { .. } => {
                tracing::debug!("Signed out");
                Ok(AuthOutcome::SignedOut)
            }
        }
    }

    /// Resolve the user behind a session reference
    pub async fn authenticate_session(&self, session: &SessionRef) -> AuthResult<User> {
        Ok(self.sessions.decode(session).await?)
    }

    fn sign_in(&self, user: User) -> AuthOutcome {
        let session = self.sessions.encode(&user);
        AuthOutcome::SignedIn { user, session }
    }
}
