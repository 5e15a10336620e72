//! Application Configuration
//!
//! Configuration for the identity application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::password::{DEFAULT_COST, MIN_COST};

use crate::domain::value_object::Provider;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Identity application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Session secret key for HMAC signing (32 bytes)
    pub session_secret: [u8; 32],
    /// Lifetime of a session reference (1 week)
    pub session_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// bcrypt work factor
    pub password_cost: u32,
    /// Providers accepted by federated login
    pub enabled_providers: Vec<Provider>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "identity_session".to_string(),
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(7 * 24 * 3600), // 1 week
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_cost: DEFAULT_COST,
            enabled_providers: Vec::new(),
        }
    }
}

impl AuthConfig {
    /// Create config with a random session secret
    pub fn with_random_secret() -> Self {
        Self {
            session_secret: platform::crypto::random_key(),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Fast hashing and every provider enabled
    pub fn testing() -> Self {
        Self {
            password_cost: MIN_COST,
            enabled_providers: Provider::ALL.to_vec(),
            ..Self::development()
        }
    }

    pub fn with_providers(mut self, providers: impl IntoIterator<Item = Provider>) -> Self {
        self.enabled_providers = providers.into_iter().collect();
        self
    }

    pub fn is_provider_enabled(&self, provider: Provider) -> bool {
        self.enabled_providers.contains(&provider)
    }

    /// Get session TTL in milliseconds
    pub fn session_ttl_ms(&self) -> i64 {
        self.session_ttl.as_millis() as i64
    }

    /// Cookie attributes for the session cookie
    pub fn cookie_config(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.session_ttl.as_secs()),
        }
    }
}
