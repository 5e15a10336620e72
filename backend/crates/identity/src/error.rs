//! Identity Error Types
//!
//! One failure enum per operation, so callers and tests can tell every
//! outcome apart, plus [`AuthError`] which the orchestrator returns and the
//! HTTP layer renders through `kernel::error::AppError`.
//!
//! Every verification failure renders the same public message
//! ([`INVALID_CREDENTIALS`]); the distinct kinds only show up in logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::Display;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::{PasswordHashError, PasswordPolicyError};
use thiserror::Error;

use crate::domain::value_object::{IdentifierError, Provider, Subject, UserId, Username};

pub type StoreResult<T> = Result<T, StoreError>;
pub type AuthResult<T> = Result<T, AuthError>;

/// Public message for every failed password login
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

// ============================================================================
// Credential Store
// ============================================================================

/// Uniqueness rules enforced by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum UniqueConstraint {
    #[display("username")]
    Username,
    #[display("provider+subject")]
    ProviderSubject,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Recoverable: the caller re-resolves or reports a conflict
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(UniqueConstraint),

    /// Store unreachable (connection refused, pool exhausted)
    #[error("Credential store unavailable: {0}")]
    Unavailable(String),

    #[error("Credential store error: {0}")]
    Backend(String),
}

impl StoreError {
    fn to_app_error(&self) -> AppError {
        match self {
            StoreError::Unavailable(_) => {
                AppError::service_unavailable("Service temporarily unavailable")
            }
            _ => AppError::internal("Internal server error"),
        }
    }
}

// ============================================================================
// Local login
// ============================================================================

#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("Unknown user")]
    UnknownUser,

    /// Federated-only account
    #[error("Account has no password")]
    NoPasswordSet,

    #[error("Wrong password")]
    BadPassword,

    #[error("Stored password hash is malformed")]
    MalformedCredentialHash,

    /// Hashing worker failed
    #[error("Password verification failed: {0}")]
    Verifier(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthFailure {
    /// True for the kinds that collapse into "invalid credentials"
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(
            self,
            AuthFailure::UnknownUser
                | AuthFailure::NoPasswordSet
                | AuthFailure::BadPassword
                | AuthFailure::MalformedCredentialHash
        )
    }

    fn to_app_error(&self) -> AppError {
        match self {
            AuthFailure::Verifier(_) => AppError::internal("Internal server error"),
            AuthFailure::Store(e) => e.to_app_error(),
            _ => AppError::unauthorized(INVALID_CREDENTIALS),
        }
    }
}

// ============================================================================
// Registration
// ============================================================================

#[derive(Debug, Error)]
pub enum RegisterFailure {
    #[error(transparent)]
    InvalidUsername(#[from] IdentifierError),

    #[error(transparent)]
    InvalidPassword(#[from] PasswordPolicyError),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] PasswordHashError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegisterFailure {
    fn to_app_error(&self) -> AppError {
        match self {
            RegisterFailure::InvalidUsername(e) => AppError::bad_request(e.to_string()),
            RegisterFailure::InvalidPassword(e) => AppError::bad_request(e.to_string()),
            RegisterFailure::UsernameTaken => AppError::conflict("Username already exists"),
            RegisterFailure::Hashing(_) => AppError::internal("Internal server error"),
            RegisterFailure::Store(e) => e.to_app_error(),
        }
    }
}

// ============================================================================
// Federated resolution
// ============================================================================

#[derive(Debug, Error)]
pub enum ResolveFailure {
    #[error(transparent)]
    InvalidSubject(#[from] IdentifierError),

    /// A credential points at a user that does not exist
    #[error("Credential {provider}/{subject} references missing user {user_id}")]
    DanglingCredential {
        provider: Provider,
        subject: Subject,
        user_id: UserId,
    },

    /// User inserted, credential insert failed, and the user could not be
    /// removed again
    #[error("User {user_id} left without credential ({cause}); cleanup failed: {cleanup}")]
    OrphanedUser {
        user_id: UserId,
        cause: StoreError,
        cleanup: StoreError,
    },

    /// The subject is already taken as a username by an unrelated account
    #[error("Username {username} is already held by another account")]
    UsernameConflict { username: Username },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResolveFailure {
    fn to_app_error(&self) -> AppError {
        match self {
            ResolveFailure::InvalidSubject(e) => AppError::bad_request(e.to_string()),
            ResolveFailure::DanglingCredential { .. } | ResolveFailure::OrphanedUser { .. } => {
                AppError::internal("Internal server error")
            }
            ResolveFailure::UsernameConflict { .. } => {
                AppError::conflict("An account with this username already exists")
            }
            ResolveFailure::Store(e) => e.to_app_error(),
        }
    }

    /// Store consistency violations
    pub fn is_consistency_violation(&self) -> bool {
        matches!(
            self,
            ResolveFailure::DanglingCredential { .. } | ResolveFailure::OrphanedUser { .. }
        )
    }
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Error)]
pub enum SessionFailure {
    #[error("No session")]
    Missing,

    #[error("Malformed session reference")]
    Malformed,

    #[error("Session signature mismatch")]
    BadSignature,

    #[error("Session expired")]
    Expired,

    #[error("Session user {0} no longer exists")]
    UserNotFound(UserId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionFailure {
    fn to_app_error(&self) -> AppError {
        match self {
            SessionFailure::Store(e) => e.to_app_error(),
            _ => AppError::unauthorized("Not authenticated"),
        }
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Login failed: {0}")]
    Login(#[from] AuthFailure),

    #[error("Registration failed: {0}")]
    Register(#[from] RegisterFailure),

    #[error("Federated login failed: {0}")]
    Federated(#[from] ResolveFailure),

    #[error("Session rejected: {0}")]
    Session(#[from] SessionFailure),

    #[error("Identity provider not enabled: {0}")]
    ProviderDisabled(Provider),

    /// The orchestrator answered a sign-in event without a session
    #[error("Sign-in produced no session")]
    MissingSession,
}

impl AuthError {
    /// Client-safe error
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Login(e) => e.to_app_error(),
            AuthError::Register(e) => e.to_app_error(),
            AuthError::Federated(e) => e.to_app_error(),
            AuthError::Session(e) => e.to_app_error(),
            AuthError::ProviderDisabled(_) => {
                AppError::bad_request("Identity provider not enabled")
            }
            AuthError::MissingSession => AppError::internal("Internal server error"),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.to_app_error().kind()
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.to_app_error().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Login(AuthFailure::MalformedCredentialHash) => {
                tracing::error!("Stored password hash is malformed");
            }
            AuthError::Login(failure) if failure.is_invalid_credentials() => {
                tracing::warn!(reason = %failure, "Invalid login attempt");
            }
            AuthError::Federated(failure) if failure.is_consistency_violation() => {
                tracing::error!(error = %failure, "Credential store consistency violation");
            }
            AuthError::Session(failure) => {
                tracing::debug!(reason = %failure, "Session rejected");
            }
            _ if self.kind().is_server_error() => {
                tracing::error!(error = %self, "Auth request failed");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
