//! Entities

pub mod federated_credential;
pub mod user;
