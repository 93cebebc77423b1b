use super::{DirectoryError, User, UserDirectory};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Process-local directory. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: RwLock<Vec<User>>,
}

impl MemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find(&self, email: &str) -> Result<Vec<User>, DirectoryError> {
        let users = self.users.read().await;

        Ok(users
            .iter()
            .filter(|user| user.email == email)
            .cloned()
            .collect())
    }

    async fn create(&self, email: &str, credential: &str) -> Result<User, DirectoryError> {
        let mut users = self.users.write().await;

        // re-check under the write lock, a concurrent signup may have won
        if users.iter().any(|user| user.email == email) {
            return Err(DirectoryError::EmailTaken);
        }

        let user = User {
            id: Uuid::now_v7(),
            email: email.to_string(),
            credential: credential.to_string(),
        };
        users.push(user.clone());

        debug!(user_id = %user.id, "user created");

        Ok(user)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
