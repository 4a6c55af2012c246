//! `SeaORM` implementation of the `AuthService` trait.

use anyhow::Context;
use async_trait::async_trait;
use tokio::task;

use crate::db::Store;
use crate::db::repositories::user::verify_password;
use crate::services::auth_service::{AuthError, AuthService, LoginResult};
use crate::services::token::{Claims, TokenSigner};

pub struct SeaOrmAuthService {
    store: Store,
    signer: TokenSigner,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, signer: TokenSigner) -> Self {
        Self { store, signer }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::Validation("Email is required".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        let Some((user, password_hash)) =
            self.store.get_user_by_email_with_password(email).await?
        else {
            tracing::debug!("Login attempt for unknown email");
            return Err(AuthError::UnknownUser);
        };

        if !user.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        let password = password.to_string();
        let is_valid = task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .context("Password verification task panicked")??;

        if !is_valid {
            tracing::info!("Failed login for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.signer.issue(&user.email)?;
        tracing::info!("User {} logged in", user.id);

        Ok(LoginResult { access_token })
    }

    fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(self.signer.verify(token)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use chrono::Duration;

    async fn service() -> SeaOrmAuthService {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap();
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        store
            .create_user("yoda@dagobah.org", "do-or-do-not", &security)
            .await
            .unwrap();

        SeaOrmAuthService::new(store, TokenSigner::new("test", Duration::minutes(15)))
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let auth = service().await;
        let result = auth.login("yoda@dagobah.org", "do-or-do-not").await.unwrap();

        let claims = auth.verify_token(&result.access_token).unwrap();
        assert_eq!(claims.sub, "yoda@dagobah.org");
    }

    #[tokio::test]
    async fn test_login_failures() {
        let auth = service().await;

        assert!(matches!(
            auth.login("yoda@dagobah.org", "try").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("maul@sith.org", "do-or-do-not").await,
            Err(AuthError::UnknownUser)
        ));
        assert!(matches!(
            auth.login("", "x").await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_rejects_garbage() {
        let auth = service().await;
        assert!(matches!(
            auth.verify_token("not-a-token"),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
