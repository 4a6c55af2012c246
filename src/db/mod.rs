use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::{DatabaseConfig, SecurityConfig};

pub mod migrator;
pub mod repositories;

pub use repositories::catalog::{Character, NewCharacter, NewPlanet, Planet};
pub use repositories::favorite::{FavoriteCharacter, FavoritePlanet};
pub use repositories::user::User;

/// Cloneable handle over the connection pool. Handlers receive it through
/// application state; there is no global session.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::with_pool_options(&config.url, config.max_connections, config.min_connections).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if let Some(path_str) = sqlite_file_path(db_url) {
            let path = Path::new(path_str);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            if !path.exists() {
                std::fs::File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .context("Failed to connect to database")?;

        migrator::Migrator::up(&conn, None)
            .await
            .context("Failed to apply migrations")?;

        info!(
            "Database connected & migrations applied (backend: {:?}, pool: {}-{})",
            conn.get_database_backend(),
            min_connections,
            max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn catalog_repo(&self) -> repositories::catalog::CatalogRepository {
        repositories::catalog::CatalogRepository::new(self.conn.clone())
    }

    fn favorite_repo(&self) -> repositories::favorite::FavoriteRepository {
        repositories::favorite::FavoriteRepository::new(self.conn.clone())
    }

    // Users

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_email_with_password(email).await
    }

    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo().create(email, password, security).await
    }

    // Catalog

    pub async fn list_planets(&self) -> Result<Vec<Planet>> {
        self.catalog_repo().list_planets().await
    }

    pub async fn get_planet(&self, id: i32) -> Result<Option<Planet>> {
        self.catalog_repo().get_planet(id).await
    }

    pub async fn find_planet_by_name(&self, name: &str) -> Result<Option<Planet>> {
        self.catalog_repo().find_planet_by_name(name).await
    }

    pub async fn create_planet(&self, planet: NewPlanet) -> Result<Planet> {
        self.catalog_repo().create_planet(planet).await
    }

    pub async fn list_characters(&self) -> Result<Vec<Character>> {
        self.catalog_repo().list_characters().await
    }

    pub async fn get_character(&self, id: i32) -> Result<Option<Character>> {
        self.catalog_repo().get_character(id).await
    }

    pub async fn find_character_by_name(&self, name: &str) -> Result<Option<Character>> {
        self.catalog_repo().find_character_by_name(name).await
    }

    pub async fn create_character(&self, character: NewCharacter) -> Result<Character> {
        self.catalog_repo().create_character(character).await
    }

    // Favorites

    pub async fn get_favorite_planets(&self, user_id: i32) -> Result<Vec<Planet>> {
        self.favorite_repo().planets_for_user(user_id).await
    }

    pub async fn get_favorite_characters(&self, user_id: i32) -> Result<Vec<Character>> {
        self.favorite_repo().characters_for_user(user_id).await
    }

    pub async fn find_favorite_planet(
        &self,
        user_id: i32,
        planet_id: i32,
    ) -> Result<Vec<FavoritePlanet>> {
        self.favorite_repo().find_planet(user_id, planet_id).await
    }

    pub async fn find_favorite_character(
        &self,
        user_id: i32,
        character_id: i32,
    ) -> Result<Vec<FavoriteCharacter>> {
        self.favorite_repo()
            .find_character(user_id, character_id)
            .await
    }

    pub async fn add_favorite_planet(&self, user_id: i32, planet_id: i32) -> Result<FavoritePlanet> {
        self.favorite_repo().add_planet(user_id, planet_id).await
    }

    pub async fn add_favorite_character(
        &self,
        user_id: i32,
        character_id: i32,
    ) -> Result<FavoriteCharacter> {
        self.favorite_repo()
            .add_character(user_id, character_id)
            .await
    }

    pub async fn remove_favorite_planet(&self, favorite_id: i32) -> Result<bool> {
        self.favorite_repo().remove_planet(favorite_id).await
    }

    pub async fn remove_favorite_character(&self, favorite_id: i32) -> Result<bool> {
        self.favorite_repo().remove_character(favorite_id).await
    }
}

/// File path behind a SQLite URL, or `None` for in-memory and non-SQLite URLs.
fn sqlite_file_path(db_url: &str) -> Option<&str> {
    let rest = db_url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let path = rest.split('?').next().unwrap_or_default();

    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(sqlite_file_path("sqlite:data/x.db"), Some("data/x.db"));
        assert_eq!(sqlite_file_path("sqlite:///tmp/x.db"), Some("/tmp/x.db"));
        assert_eq!(
            sqlite_file_path("sqlite://data/x.db?mode=rwc"),
            Some("data/x.db")
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgresql://u@h/db"), None);
    }

    async fn memory_store() -> Store {
        Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap()
    }

    fn fast_security() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    fn tatooine() -> NewPlanet {
        NewPlanet {
            name: "Tatooine".to_string(),
            climate: "arid".to_string(),
            terrain: "desert".to_string(),
            population: Some(200_000),
            diameter: Some(10_465),
        }
    }

    #[tokio::test]
    async fn test_store_ping() {
        let store = memory_store().await;
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_user_lookup_by_email() {
        let store = memory_store().await;
        let user = store
            .create_user("luke@rebellion.org", "x-wing", &fast_security())
            .await
            .unwrap();

        let (found, hash) = store
            .get_user_by_email_with_password("luke@rebellion.org")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, user);
        assert_ne!(hash, "x-wing");

        assert!(
            store
                .get_user_by_email_with_password("vader@empire.gov")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = memory_store().await;
        store
            .create_user("leia@rebellion.org", "a", &fast_security())
            .await
            .unwrap();
        assert!(
            store
                .create_user("leia@rebellion.org", "b", &fast_security())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_favorite_planets_roundtrip() {
        let store = memory_store().await;
        let user = store
            .create_user("han@falcon.net", "kessel", &fast_security())
            .await
            .unwrap();
        let planet = store.create_planet(tatooine()).await.unwrap();

        assert!(store.get_favorite_planets(user.id).await.unwrap().is_empty());

        let fav = store.add_favorite_planet(user.id, planet.id).await.unwrap();
        assert_eq!(store.get_favorite_planets(user.id).await.unwrap(), vec![
            planet.clone()
        ]);

        let matches = store.find_favorite_planet(user.id, planet.id).await.unwrap();
        assert_eq!(matches.len(), 1);

        assert!(store.remove_favorite_planet(fav.id).await.unwrap());
        assert!(!store.remove_favorite_planet(fav.id).await.unwrap());
        assert!(store.get_favorite_planets(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unique_favorite_index() {
        let store = memory_store().await;
        let user = store
            .create_user("chewie@falcon.net", "rrrargh", &fast_security())
            .await
            .unwrap();
        let planet = store.create_planet(tatooine()).await.unwrap();

        store.add_favorite_planet(user.id, planet.id).await.unwrap();
        let err = store
            .add_favorite_planet(user.id, planet.id)
            .await
            .unwrap_err();
        let db_err = err.downcast_ref::<sea_orm::DbErr>().unwrap();
        assert!(matches!(
            db_err.sql_err(),
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
        ));
    }
}
