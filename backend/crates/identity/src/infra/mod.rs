//! Infrastructure Layer
//!
//! Credential store implementations.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCredentialStore;
pub use postgres::{PgCredentialStore, STORE_CONNECT_ATTEMPTS};
