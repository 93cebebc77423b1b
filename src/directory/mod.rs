//! User directory: where users and their stored credentials live.
//!
//! The auth flows only need `find` and `create`. Email uniqueness is the
//! directory's job; two concurrent signups for the same email must end with
//! exactly one [`DirectoryError::EmailTaken`].

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use self::memory::MemoryDirectory;
pub use self::postgres::PgDirectory;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("email already registered")]
    EmailTaken,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Stored `salt.hash` credential, never the plaintext password.
    pub credential: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("credential", &"***")
            .finish()
    }
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// All users registered with exactly this email (zero or one in practice).
    async fn find(&self, email: &str) -> Result<Vec<User>, DirectoryError>;

    /// Store a new user.
    ///
    /// # Errors
    /// Returns [`DirectoryError::EmailTaken`] if the email is already registered.
    async fn create(&self, email: &str, credential: &str) -> Result<User, DirectoryError>;

    /// Liveness check used by `/health`.
    async fn ping(&self) -> Result<(), DirectoryError> {
        Ok(())
    }

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}
