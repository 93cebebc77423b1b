//! HTTP handlers and the request/response types they share.

pub mod health;
pub mod signin;
pub mod signup;

use crate::{auth::AuthError, credential::CredentialError, directory::User};
use axum::http::StatusCode;
use regex::Regex;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;
use uuid::Uuid;

/// Body shared by unknown-email and wrong-password signin failures.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(ToSchema, Deserialize)]
pub struct CredentialsRequest {
    email: String,
    password: String,
}

impl std::fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// Normalize an email for lookup/uniqueness checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic `local@domain.tld` check on already-normalized input.
pub(crate) fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Map a flow failure to a status and body. Server-side failures are logged here,
/// except a malformed stored credential which `AuthService::signin` already logged.
pub(crate) fn error_response(err: &AuthError) -> (StatusCode, String) {
    match err {
        AuthError::EmailInUse => (StatusCode::BAD_REQUEST, "Email in use".to_string()),
        AuthError::UserNotFound => (StatusCode::NOT_FOUND, INVALID_CREDENTIALS.to_string()),
        AuthError::InvalidPassword => (StatusCode::BAD_REQUEST, INVALID_CREDENTIALS.to_string()),
        AuthError::Credential(CredentialError::EmptyPassword) => {
            (StatusCode::BAD_REQUEST, "Invalid password".to_string())
        }
        AuthError::MalformedCredential => {
            debug!("Authentication failed: {}", err);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
        AuthError::Credential(_) | AuthError::Directory(_) | AuthError::Blocking(_) => {
            error!("Authentication failed: {}", err);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

/// Validate and normalize an incoming credentials payload.
pub(crate) fn validate(
    request: CredentialsRequest,
) -> Result<(String, SecretString), (StatusCode, String)> {
    let email = normalize_email(&request.email);

    if !valid_email(&email) {
        return Err((StatusCode::BAD_REQUEST, "Invalid email".to_string()));
    }

    if request.password.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Invalid password".to_string()));
    }

    Ok((email, SecretString::from(request.password)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::DirectoryError;
    use secrecy::ExposeSecret;
    use std::{
        io,
        sync::{Arc, Mutex},
    };
    use tracing::Level;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if let Ok(mut inner) = self.0.lock() {
                inner.extend_from_slice(buf);
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            self.0
                .lock()
                .map(|inner| String::from_utf8_lossy(&inner).into_owned())
                .unwrap_or_default()
        }
    }

    fn logged(err: &AuthError) -> (StatusCode, String) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let (status, _) = tracing::subscriber::with_default(subscriber, || error_response(err));
        (status, buffer.contents())
    }

    #[test]
    fn test_valid_email() {
        assert!(valid_email("a@x.com"));
        assert!(valid_email("first.last@sub.example.org"));
        assert!(!valid_email("a"));
        assert!(!valid_email("a@x"));
        assert!(!valid_email("a b@x.com"));
        assert!(!valid_email("@x.com"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(
            error_response(&AuthError::EmailInUse).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(&AuthError::UserNotFound).0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_response(&AuthError::InvalidPassword).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(&AuthError::MalformedCredential).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            error_response(&AuthError::Credential(CredentialError::EmptyPassword)).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(&AuthError::Directory(DirectoryError::Database(
                sqlx::Error::PoolClosed
            )))
            .0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_malformed_credential_not_logged_as_error_again() {
        let (status, logs) = logged(&AuthError::MalformedCredential);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(logs.contains("DEBUG"));
        assert!(!logs.contains("ERROR"));

        let (status, logs) = logged(&AuthError::Directory(DirectoryError::Database(
            sqlx::Error::PoolClosed,
        )));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(logs.contains("ERROR"));
    }

    #[test]
    fn test_signin_failures_share_body() {
        assert_eq!(
            error_response(&AuthError::UserNotFound).1,
            error_response(&AuthError::InvalidPassword).1
        );
    }

    #[test]
    fn test_validate() {
        let ok = validate(CredentialsRequest {
            email: " Test@Example.com".to_string(),
            password: "pw".to_string(),
        });
        assert!(ok.is_ok());
        if let Ok((email, password)) = ok {
            assert_eq!(email, "test@example.com");
            assert_eq!(password.expose_secret(), "pw");
        }

        let bad_email = validate(CredentialsRequest {
            email: "nope".to_string(),
            password: "pw".to_string(),
        });
        assert_eq!(bad_email.err().map(|e| e.0), Some(StatusCode::BAD_REQUEST));

        let empty_password = validate(CredentialsRequest {
            email: "a@x.com".to_string(),
            password: String::new(),
        });
        assert_eq!(
            empty_password.err().map(|e| e.0),
            Some(StatusCode::BAD_REQUEST)
        );
    }

    #[test]
    fn test_request_debug_redacts_password() {
        let request = CredentialsRequest {
            email: "a@x.com".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{request:?}").contains("hunter2"));
    }
}
