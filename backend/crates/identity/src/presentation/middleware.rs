//! Session Middleware
//!
//! Middleware for requiring a valid session on protected routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::application::SessionRef;
use crate::domain::entity::user::User;
use crate::domain::repository::{FederatedCredentialRepository, UserRepository};
use crate::error::{AuthError, SessionFailure};
use crate::presentation::handlers::AuthAppState;

/// Authenticated user stored in request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware that requires a valid session cookie
///
/// Decodes the cookie, reloads the user and makes it available to the
/// handler as [`CurrentUser`]. Responds 401 otherwise.
pub async fn require_session<R>(
    State(state): State<AuthAppState<R>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    R: UserRepository + FederatedCredentialRepository + Send + Sync + 'static,
{
    let token = platform::cookie::extract_cookie(req.headers(), &state.config().session_cookie_name)
        .ok_or(SessionFailure::Missing)?;

    let user = state
        .orchestrator
        .authenticate_session(&SessionRef::new(token))
        .await?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
