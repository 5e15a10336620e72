//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod federated;
pub mod local;
pub mod orchestrator;
pub mod password;
pub mod session;

// Re-exports
pub use config::AuthConfig;
pub use federated::{FederatedResolver, MAX_RESOLVE_ATTEMPTS};
pub use local::LocalAuthenticator;
pub use orchestrator::{AuthEvent, AuthOrchestrator, AuthOutcome};
pub use password::PasswordVerifier;
pub use session::{SessionCodec, SessionRef};
