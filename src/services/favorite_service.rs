//! Domain service for user favorites.
//!
//! A favorite links one user to one planet or one character. Adding checks that
//! both ends exist and that the pair is not already present; removing requires
//! exactly one matching row.

use std::fmt;
use thiserror::Error;

use crate::db::{Character, Planet};

/// What a favorite points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteTarget {
    Planet(i32),
    Character(i32),
}

impl FavoriteTarget {
    #[must_use]
    pub const fn id(self) -> i32 {
        match self {
            Self::Planet(id) | Self::Character(id) => id,
        }
    }

    #[must_use]
    pub const fn kind(self) -> &'static str {
        match self {
            Self::Planet(_) => "Planet",
            Self::Character(_) => "Character",
        }
    }
}

impl fmt::Display for FavoriteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// Errors specific to favorite operations.
#[derive(Debug, Error)]
pub enum FavoriteError {
    #[error("User {0} not found")]
    UserNotFound(i32),

    #[error("{0} not found")]
    TargetNotFound(FavoriteTarget),

    #[error("{target} is not a favorite of user {user_id}")]
    NotFavorited { user_id: i32, target: FavoriteTarget },

    #[error("{target} is already a favorite of user {user_id}")]
    AlreadyFavorited { user_id: i32, target: FavoriteTarget },

    #[error("{count} favorites match user {user_id} and {target}")]
    Ambiguous {
        user_id: i32,
        target: FavoriteTarget,
        count: usize,
    },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for FavoriteError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for FavoriteError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

/// A user's favorites resolved to their catalog entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFavorites {
    pub user_id: i32,
    pub planets: Vec<Planet>,
    pub characters: Vec<Character>,
}

/// Domain service trait for favorites.
#[async_trait::async_trait]
pub trait FavoriteService: Send + Sync {
    /// Lists a user's favorites. An existing user without favorites gets
    /// empty lists.
    ///
    /// # Errors
    ///
    /// Returns [`FavoriteError::UserNotFound`] for an unknown user.
    async fn list_for_user(&self, user_id: i32) -> Result<UserFavorites, FavoriteError>;

    /// Records `target` as a favorite of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`FavoriteError::AlreadyFavorited`] if the pair already exists.
    async fn add(&self, user_id: i32, target: FavoriteTarget) -> Result<(), FavoriteError>;

    /// Deletes the single favorite linking `user_id` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`FavoriteError::NotFavorited`] when nothing matches and
    /// [`FavoriteError::Ambiguous`] when more than one row does.
    async fn remove(&self, user_id: i32, target: FavoriteTarget) -> Result<(), FavoriteError>;
}
