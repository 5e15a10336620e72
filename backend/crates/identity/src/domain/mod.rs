//! Domain Layer
//!
//! Entities, value objects, and the credential store traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{federated_credential::FederatedCredential, user::User};
pub use repository::{FederatedCredentialRepository, UserRepository};
