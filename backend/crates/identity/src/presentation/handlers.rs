//! HTTP Handlers

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{AuthEvent, AuthOrchestrator, AuthOutcome, SessionRef};
use crate::domain::entity::user::User;
use crate::domain::repository::{FederatedCredentialRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{PasswordLoginRequest, RegisterRequest, UserResponse};
use crate::presentation::middleware::CurrentUser;

/// Shared state for identity handlers
pub struct AuthAppState<R>
where
    R: UserRepository + FederatedCredentialRepository + Send + Sync + 'static,
{
    pub orchestrator: Arc<AuthOrchestrator<R>>,
}

impl<R> AuthAppState<R>
where
    R: UserRepository + FederatedCredentialRepository + Send + Sync + 'static,
{
    pub fn new(store: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            orchestrator: Arc::new(AuthOrchestrator::new(store, config)),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        self.orchestrator.config()
    }
}

// Manual impl: the store itself does not need to be Clone
impl<R> Clone for AuthAppState<R>
where
    R: UserRepository + FederatedCredentialRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            orchestrator: self.orchestrator.clone(),
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + FederatedCredentialRepository + Send + Sync + 'static,
{
    let outcome = state
        .orchestrator
        .handle(AuthEvent::LocalRegister {
            username: req.username,
            password: req.password,
        })
        .await?;

    let (user, cookie) = signed_in(&state, outcome)?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::from(&user)),
    ))
}

// ============================================================================
// Password Login
// ============================================================================

/// POST /auth/login/password
pub async fn login_password<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<PasswordLoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + FederatedCredentialRepository + Send + Sync + 'static,
{
    let outcome = state
        .orchestrator
        .handle(AuthEvent::LocalLogin {
            username: req.username,
            password: req.password,
        })
        .await?;

    let (user, cookie) = signed_in(&state, outcome)?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::from(&user)),
    ))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /auth/logout
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + FederatedCredentialRepository + Send + Sync + 'static,
{
    let cookie_config = state.config().cookie_config();

    if let Some(token) = platform::cookie::extract_cookie(&headers, &cookie_config.name) {
        state
            .orchestrator
            .handle(AuthEvent::Logout {
                session: SessionRef::new(token),
            })
            .await?;
    }

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, cookie_config.build_delete_cookie())],
    ))
}

// ============================================================================
// Current User
// ============================================================================

/// GET /auth/me (behind `require_session`)
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

// ============================================================================
// Helpers
// ============================================================================

fn signed_in<R>(state: &AuthAppState<R>, outcome: AuthOutcome) -> AuthResult<(User, String)>
where
    R: UserRepository + FederatedCredentialRepository + Send + Sync + 'static,
{
    match outcome {
        AuthOutcome::SignedIn { user, session } => {
            let cookie = state
                .config()
                .cookie_config()
                .build_set_cookie(session.as_str());
            Ok((user, cookie))
        }
        AuthOutcome::SignedOut => Err(AuthError::MissingSession),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::InMemoryCredentialStore;

    #[test]
    fn test_signed_out_outcome_is_not_a_sign_in() {
        let state = AuthAppState::new(
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(AuthConfig::testing()),
        );

        let err = signed_in(&state, AuthOutcome::SignedOut).unwrap_err();
        assert!(matches!(err, AuthError::MissingSession));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
