use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered identity, as exposed to the rest of the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Stored identity row, password hash included. Never leaves the storage
/// and login paths.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Identity store failure: {0}")]
    Store(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Storage contract for identities.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Create a new identity. Fails with `Validation` when the username is
    /// already taken.
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, IdentityError>;

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, IdentityError>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, IdentityError>;
}
