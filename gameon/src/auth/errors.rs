//! Authentication error types.

use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token encoding failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Store(#[from] crate::game::GameError),
}

impl AuthError {
    /// Stable machine-checkable identifier for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::UsernameTaken => "username_taken",
            AuthError::EmailTaken => "email_taken",
            AuthError::InvalidUsername(_) => "validation_error",
            AuthError::WeakPassword(_) => "validation_error",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InvalidToken => "invalid_token",
            AuthError::Hashing(_) => "internal_error",
            AuthError::Token(_) => "internal_error",
            AuthError::Store(e) => e.code(),
        }
    }

    /// Client-safe message.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Hashing(_) | AuthError::Token(_) => "Internal server error".to_string(),
            AuthError::Store(e) => e.client_message(),
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
