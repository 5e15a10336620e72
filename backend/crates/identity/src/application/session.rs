//! Session Identity Codec
//!
//! A session reference carries only the user id and an expiry, signed with
//! the session secret:
//!
//! ```text
//! <user_uuid>.<expires_at_ms>.<base64url(hmac_sha256(secret, "<user_uuid>.<expires_at_ms>"))>
//! ```
//!
//! Decoding always reloads the full user from the store, so a reference
//! never outlives the account it points to.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use platform::crypto::{from_base64_url, hmac_sha256, to_base64_url, verify_hmac_sha256};

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::UserId;
use crate::error::SessionFailure;

/// Opaque session reference handed to the client
#[derive(Clone, PartialEq, Eq)]
pub struct SessionRef(String);

impl SessionRef {
    /// Wrap a value received from the client (not verified)
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionRef").field(&"[REDACTED]").finish()
    }
}

pub struct SessionCodec<S>
where
    S: UserRepository + Send + Sync + 'static,
{
    store: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> SessionCodec<S>
where
    S: UserRepository + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self { store, config }
    }

    pub fn encode(&self, user: &User) -> SessionRef {
        self.encode_at(user, Utc::now().timestamp_millis())
    }

    /// Encode with an explicit clock (milliseconds since epoch)
    pub fn encode_at(&self, user: &User, now_ms: i64) -> SessionRef {
        let expires_at_ms = now_ms + self.config.session_ttl_ms();
        let payload = format!("{}.{}", user.user_id, expires_at_ms);
        let signature = hmac_sha256(&self.config.session_secret, payload.as_bytes());

        SessionRef(format!("{payload}.{}", to_base64_url(&signature)))
    }

    /// Verify the reference and reload its user
    pub async fn decode(&self, session: &SessionRef) -> Result<User, SessionFailure> {
        self.decode_at(session, Utc::now().timestamp_millis()).await
    }

    pub async fn decode_at(&self, session: &SessionRef, now_ms: i64) -> Result<User, SessionFailure> {
        let user_id = self.verify_claims(session, now_ms)?;

        self.store
            .find_user_by_id(&user_id)
            .await?
            .ok_or(SessionFailure::UserNotFound(user_id))
    }

    /// Check shape, signature and expiry without touching the store
    pub fn verify_claims(&self, session: &SessionRef, now_ms: i64) -> Result<UserId, SessionFailure> {
        let (payload, signature_b64) = session
            .as_str()
            .rsplit_once('.')
            .ok_or(SessionFailure::Malformed)?;
        let (user_id, expires_at_ms) = payload
            .split_once('.')
            .ok_or(SessionFailure::Malformed)?;

        let signature = from_base64_url(signature_b64).map_err(|_| SessionFailure::Malformed)?;
        if !verify_hmac_sha256(&self.config.session_secret, payload.as_bytes(), &signature) {
            return Err(SessionFailure::BadSignature);
        }

        let user_id: UserId = user_id.parse().map_err(|_| SessionFailure::Malformed)?;
        let expires_at_ms: i64 = expires_at_ms
            .parse()
            .map_err(|_| SessionFailure::Malformed)?;

        if expires_at_ms <= now_ms {
            return Err(SessionFailure::Expired);
        }

        Ok(user_id)
    }
}
