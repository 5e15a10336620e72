//! PostgreSQL Credential Store
//!
//! Uniqueness of `users.username` and of `(provider, subject)` is enforced
//! by unique constraints; their violations come back as
//! [`StoreError::UniqueViolation`] so the application layer can react.

use std::time::Duration;

use chrono::{DateTime, Utc};
use platform::retry::{RetryError, RetryPolicy, retry_bounded};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::domain::entity::{federated_credential::FederatedCredential, user::User};
use crate::domain::repository::{FederatedCredentialRepository, UserRepository};
use crate::domain::value_object::{Provider, Subject, UserId, UserPassword, Username};
use crate::error::{StoreError, StoreResult, UniqueConstraint};

/// Connection attempts at startup before giving up
pub const STORE_CONNECT_ATTEMPTS: u32 = 3;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const PROVIDER_SUBJECT_CONSTRAINT: &str = "federated_credentials_provider_subject_key";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                match db_err.constraint() {
                    Some(USERNAME_CONSTRAINT) => {
                        StoreError::UniqueViolation(UniqueConstraint::Username)
                    }
                    Some(PROVIDER_SUBJECT_CONSTRAINT) => {
                        StoreError::UniqueViolation(UniqueConstraint::ProviderSubject)
                    }
                    _ => StoreError::Backend(err.to_string()),
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

/// PostgreSQL-backed credential store
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with a bounded number of immediate attempts
    pub async fn connect(database_url: &str) -> Result<Self, RetryError<sqlx::Error>> {
        let pool = retry_bounded(
            "database connect",
            RetryPolicy::immediate(STORE_CONNECT_ATTEMPTS),
            |attempt| {
                tracing::info!(attempt, "Connecting to database");
                PgPoolOptions::new()
                    .max_connections(10)
                    .acquire_timeout(Duration::from_secs(5))
                    .connect(database_url)
            },
        )
        .await?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgCredentialStore {
    async fn find_user_by_id(&self, user_id: &UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                username,
                name,
                password,
                created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_user_by_username(&self, username: &Username) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                username,
                name,
                password,
                created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                username,
                name,
                password,
                created_at
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.username.as_str())
        .bind(user.display_name.as_deref())
        .bind(user.password_hash.as_ref().map(|p| p.as_str()))
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_user(&self, user_id: &UserId) -> StoreResult<bool> {
        let deleted = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Federated Credential Repository Implementation
// ============================================================================

impl FederatedCredentialRepository for PgCredentialStore {
    async fn find_federated_credential(
        &self,
        provider: Provider,
        subject: &Subject,
    ) -> StoreResult<Option<FederatedCredential>> {
        let row = sqlx::query_as::<_, FederatedCredentialRow>(
            r#"
            SELECT
                user_id,
                provider,
                subject,
                created_at
            FROM federated_credentials
            WHERE provider = $1 AND subject = $2
            "#,
        )
        .bind(provider.as_str())
        .bind(subject.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(FederatedCredentialRow::into_credential).transpose()
    }

    async fn insert_federated_credential(
        &self,
        credential: &FederatedCredential,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO federated_credentials (
                user_id,
                provider,
                subject,
                created_at
            ) VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(credential.user_id.as_uuid())
        .bind(credential.provider.as_str())
        .bind(credential.subject.as_str())
        .bind(credential.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    username: String,
    name: Option<String>,
    password: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            user_id: UserId::from_uuid(self.user_id),
            username: Username::from_db(self.username),
            password_hash: self.password.map(UserPassword::from_db),
            display_name: self.name,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FederatedCredentialRow {
    user_id: Uuid,
    provider: String,
    subject: String,
    created_at: DateTime<Utc>,
}

impl FederatedCredentialRow {
    fn into_credential(self) -> StoreResult<FederatedCredential> {
        let provider = self
            .provider
            .parse::<Provider>()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(FederatedCredential {
            user_id: UserId::from_uuid(self.user_id),
            provider,
            subject: Subject::from_db(self.subject),
            created_at: self.created_at,
        })
    }
}
