//! Signup and signin over a [`CredentialManager`] and a [`UserDirectory`].
//!
//! Both flows are single request/response sequences with no retries. Key
//! derivation runs on the tokio blocking pool so a slow scrypt never parks an
//! executor thread.

use crate::{
    credential::{CredentialError, CredentialManager},
    directory::{DirectoryError, User, UserDirectory},
};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, error, instrument};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email in use")]
    EmailInUse,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid password")]
    InvalidPassword,
    #[error("stored credential is malformed")]
    MalformedCredential,
    #[error(transparent)]
    Credential(CredentialError),
    #[error(transparent)]
    Directory(DirectoryError),
    #[error("credential task failed: {0}")]
    Blocking(#[from] JoinError),
}

impl From<CredentialError> for AuthError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Malformed => Self::MalformedCredential,
            other => Self::Credential(other),
        }
    }
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::EmailTaken => Self::EmailInUse,
            other => Self::Directory(other),
        }
    }
}

pub struct AuthService {
    directory: Arc<dyn UserDirectory>,
    credentials: CredentialManager,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("directory", &self.directory.backend())
            .field("credentials", &self.credentials)
            .finish()
    }
}

impl AuthService {
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>, credentials: CredentialManager) -> Self {
        Self {
            directory,
            credentials,
        }
    }

    #[must_use]
    pub fn directory(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }

    /// Register `email` with a freshly salted hash of `password`.
    ///
    /// # Errors
    /// [`AuthError::EmailInUse`] if the email is already registered, including when a
    /// concurrent signup wins the race inside the directory.
    #[instrument(skip(self, password))]
    pub async fn signup(&self, email: &str, password: &SecretString) -> Result<User, AuthError> {
        if !self.directory.find(email).await?.is_empty() {
            debug!("email in use");
            return Err(AuthError::EmailInUse);
        }

        let credentials = self.credentials.clone();
        let password = SecretString::from(password.expose_secret().to_owned());
        let credential =
            tokio::task::spawn_blocking(move || credentials.hash(password.expose_secret()))
                .await??;

        let user = self
            .directory
            .create(email, &credential.to_string())
            .await?;

        debug!(user_id = %user.id, "signup complete");

        Ok(user)
    }

    /// Return the user registered with `email` if `password` matches.
    ///
    /// # Errors
    /// [`AuthError::UserNotFound`] for unknown emails, [`AuthError::InvalidPassword`] on
    /// mismatch, [`AuthError::MalformedCredential`] if the stored credential is corrupt.
    #[instrument(skip(self, password))]
    pub async fn signin(&self, email: &str, password: &SecretString) -> Result<User, AuthError> {
        let Some(user) = self.directory.find(email).await?.into_iter().next() else {
            debug!("user not found");
            return Err(AuthError::UserNotFound);
        };

        let credentials = self.credentials.clone();
        let password = SecretString::from(password.expose_secret().to_owned());
        let stored = user.credential.clone();
        let verified =
            tokio::task::spawn_blocking(move || credentials.verify(password.expose_secret(), &stored))
                .await?;

        match verified {
            Ok(true) => {
                debug!(user_id = %user.id, "signin complete");
                Ok(user)
            }
            Ok(false) => {
                debug!(user_id = %user.id, "invalid password");
                Err(AuthError::InvalidPassword)
            }
            Err(err) => {
                error!(user_id = %user.id, "stored credential rejected: {}", err);
                Err(err.into())
            }
        }
    }
}
