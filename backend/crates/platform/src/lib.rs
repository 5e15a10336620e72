//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations used by the identity service:
//! - Password hashing and verification (bcrypt)
//! - HMAC signing and Base64 helpers
//! - Cookie handling
//! - Bounded retry for startup dependencies

pub mod cookie;
pub mod crypto;
pub mod password;
pub mod retry;
