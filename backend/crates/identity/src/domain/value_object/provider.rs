//! Federated Identity Provider
//!
//! Closed set of OAuth2 providers a user can sign in with. Stored as the
//! lowercase name in `federated_credentials.provider`.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[display("google")]
    Google,
    #[display("facebook")]
    Facebook,
    #[display("twitter")]
    Twitter,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown identity provider: {0}")]
pub struct UnknownProvider(pub String);

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Google, Provider::Facebook, Provider::Twitter];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Facebook => "facebook",
            Provider::Twitter => "twitter",
        }
    }
}

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownProvider(s.to_string()))
    }
}
