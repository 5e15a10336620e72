//! Identity Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, credential store traits
//! - `application/` - Authenticators, resolver, session codec, orchestrator
//! - `infra/` - PostgreSQL and in-memory credential stores
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Local registration and login with username + password
//! - Federated login (Google, Facebook, Twitter) resolved to one internal user
//! - Stateless signed session references, reloaded from the store on decode
//!
//! ## Security Model
//! - Passwords hashed with bcrypt, work factor 12
//! - Every failed password login reports the same "Invalid credentials"
//! - Session references signed with HMAC-SHA256 and checked in constant time

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::{AuthEvent, AuthOrchestrator, AuthOutcome, SessionRef};
pub use error::{AuthError, AuthResult};
pub use infra::postgres::{PgCredentialStore, STORE_CONNECT_ATTEMPTS};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::{federated_credential::FederatedCredential, user::User};
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod store {
    pub use crate::infra::memory::InMemoryCredentialStore;
    pub use crate::infra::postgres::PgCredentialStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
