//! Identity Router

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{FederatedCredentialRepository, UserRepository};
use crate::infra::postgres::PgCredentialStore;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_session;

/// Create the identity router with the PostgreSQL store
pub fn auth_router(store: PgCredentialStore, config: AuthConfig) -> Router {
    auth_router_generic(Arc::new(store), Arc::new(config))
}

/// Create an identity router for any store implementation
pub fn auth_router_generic<R>(store: Arc<R>, config: Arc<AuthConfig>) -> Router
where
    R: UserRepository + FederatedCredentialRepository + Send + Sync + 'static,
{
    let state = AuthAppState::new(store, config);

    let protected = Router::new()
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session::<R>,
        ));

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login/password", post(handlers::login_password::<R>))
        .route("/logout", post(handlers::logout::<R>))
        .merge(protected)
        .with_state(state)
}
