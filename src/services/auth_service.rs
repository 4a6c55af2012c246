//! Domain service for authentication.
//!
//! Exchanges email/password credentials for a signed access token and
//! resolves tokens back to the identity they were issued for.

use serde::Serialize;
use thiserror::Error;

use super::token::{Claims, TokenError};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User does not exist")]
    UnknownUser,

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// Login result containing the bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub access_token: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and issues an access token keyed by email.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownUser`] or [`AuthError::InvalidCredentials`]
    /// if login fails.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Verifies a bearer token and returns its claims.
    fn verify_token(&self, token: &str) -> Result<Claims, AuthError>;
}
