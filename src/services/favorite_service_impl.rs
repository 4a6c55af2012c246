//! `SeaORM` implementation of the `FavoriteService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::Store;
use crate::services::favorite_service::{
    FavoriteError, FavoriteService, FavoriteTarget, UserFavorites,
};

pub struct SeaOrmFavoriteService {
    store: Store,
}

impl SeaOrmFavoriteService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn ensure_user(&self, user_id: i32) -> Result<(), FavoriteError> {
        match self.store.get_user(user_id).await? {
            Some(_) => Ok(()),
            None => Err(FavoriteError::UserNotFound(user_id)),
        }
    }

    async fn ensure_target(&self, target: FavoriteTarget) -> Result<(), FavoriteError> {
        let exists = match target {
            FavoriteTarget::Planet(id) => self.store.get_planet(id).await?.is_some(),
            FavoriteTarget::Character(id) => self.store.get_character(id).await?.is_some(),
        };

        if exists {
            Ok(())
        } else {
            Err(FavoriteError::TargetNotFound(target))
        }
    }

    /// Favorite row ids linking the user to the target.
    async fn matching_rows(
        &self,
        user_id: i32,
        target: FavoriteTarget,
    ) -> Result<Vec<i32>, FavoriteError> {
        let ids = match target {
            FavoriteTarget::Planet(id) => self
                .store
                .find_favorite_planet(user_id, id)
                .await?
                .into_iter()
                .map(|f| f.id)
                .collect(),
            FavoriteTarget::Character(id) => self
                .store
                .find_favorite_character(user_id, id)
                .await?
                .into_iter()
                .map(|f| f.id)
                .collect(),
        };

        Ok(ids)
    }
}

/// The unique index can still fire when two requests race past the
/// duplicate check.
fn map_insert_error(err: anyhow::Error, user_id: i32, target: FavoriteTarget) -> FavoriteError {
    let unique_violation = err
        .downcast_ref::<sea_orm::DbErr>()
        .and_then(sea_orm::DbErr::sql_err)
        .is_some_and(|e| matches!(e, sea_orm::SqlErr::UniqueConstraintViolation(_)));

    if unique_violation {
        FavoriteError::AlreadyFavorited { user_id, target }
    } else {
        FavoriteError::from(err)
    }
}

#[async_trait]
impl FavoriteService for SeaOrmFavoriteService {
    async fn list_for_user(&self, user_id: i32) -> Result<UserFavorites, FavoriteError> {
        self.ensure_user(user_id).await?;

        let planets = self.store.get_favorite_planets(user_id).await?;
        let characters = self.store.get_favorite_characters(user_id).await?;

        Ok(UserFavorites {
            user_id,
            planets,
            characters,
        })
    }

    async fn add(&self, user_id: i32, target: FavoriteTarget) -> Result<(), FavoriteError> {
        self.ensure_user(user_id).await?;
        self.ensure_target(target).await?;

        if !self.matching_rows(user_id, target).await?.is_empty() {
            return Err(FavoriteError::AlreadyFavorited { user_id, target });
        }

        let inserted = match target {
            FavoriteTarget::Planet(id) => self
                .store
                .add_favorite_planet(user_id, id)
                .await
                .map(|_| ()),
            FavoriteTarget::Character(id) => self
                .store
                .add_favorite_character(user_id, id)
                .await
                .map(|_| ()),
        };
        inserted.map_err(|e| map_insert_error(e, user_id, target))?;

        info!("User {} added favorite {}", user_id, target);
        Ok(())
    }

    async fn remove(&self, user_id: i32, target: FavoriteTarget) -> Result<(), FavoriteError> {
        let rows = self.matching_rows(user_id, target).await?;

        let favorite_id = match rows.as_slice() {
            [] => return Err(FavoriteError::NotFavorited { user_id, target }),
            [id] => *id,
            _ => {
                return Err(FavoriteError::Ambiguous {
                    user_id,
                    target,
                    count: rows.len(),
                });
            }
        };

        let removed = match target {
            FavoriteTarget::Planet(_) => self.store.remove_favorite_planet(favorite_id).await?,
            FavoriteTarget::Character(_) => {
                self.store.remove_favorite_character(favorite_id).await?
            }
        };

        // Lost a race with a concurrent delete.
        if !removed {
            return Err(FavoriteError::NotFavorited { user_id, target });
        }

        info!("User {} removed favorite {}", user_id, target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::config::SecurityConfig;
    use crate::db::{NewCharacter, NewPlanet};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use sea_orm::ConnectionTrait;

    struct Fixture {
        store: Store,
        service: SeaOrmFavoriteService,
        user_id: i32,
        planet_id: i32,
        character_id: i32,
    }

    async fn fixture() -> Fixture {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap();
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };

        let user = store
            .create_user("obiwan@jedi.org", "high-ground", &security)
            .await
            .unwrap();
        let planet = store
            .create_planet(NewPlanet {
                name: "Naboo".to_string(),
                climate: "temperate".to_string(),
                terrain: "grassy hills, swamps, forests, mountains".to_string(),
                population: Some(4_500_000_000),
                diameter: Some(12_120),
            })
            .await
            .unwrap();
        let character = store
            .create_character(NewCharacter {
                name: "Padmé Amidala".to_string(),
                gender: "female".to_string(),
                birth_year: "46BBY".to_string(),
                height: Some(185),
                eye_color: "brown".to_string(),
                hair_color: "brown".to_string(),
            })
            .await
            .unwrap();

        Fixture {
            service: SeaOrmFavoriteService::new(store.clone()),
            store,
            user_id: user.id,
            planet_id: planet.id,
            character_id: character.id,
        }
    }

    #[tokio::test]
    async fn test_empty_favorites() {
        let f = fixture().await;
        let favorites = f.service.list_for_user(f.user_id).await.unwrap();
        assert_eq!(favorites.user_id, f.user_id);
        assert!(favorites.planets.is_empty());
        assert!(favorites.characters.is_empty());
    }

    #[tokio::test]
    async fn test_add_list_remove() {
        let f = fixture().await;
        let planet = FavoriteTarget::Planet(f.planet_id);
        let character = FavoriteTarget::Character(f.character_id);

        f.service.add(f.user_id, planet).await.unwrap();
        f.service.add(f.user_id, character).await.unwrap();

        let favorites = f.service.list_for_user(f.user_id).await.unwrap();
        assert_eq!(favorites.planets.len(), 1);
        assert_eq!(favorites.planets[0].name, "Naboo");
        assert_eq!(favorites.characters[0].name, "Padmé Amidala");

        f.service.remove(f.user_id, planet).await.unwrap();
        let favorites = f.service.list_for_user(f.user_id).await.unwrap();
        assert!(favorites.planets.is_empty());
        assert_eq!(favorites.characters.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_add_conflicts() {
        let f = fixture().await;
        let target = FavoriteTarget::Planet(f.planet_id);

        f.service.add(f.user_id, target).await.unwrap();
        let err = f.service.add(f.user_id, target).await.unwrap_err();
        assert!(matches!(err, FavoriteError::AlreadyFavorited { .. }));
    }

    #[tokio::test]
    async fn test_missing_references() {
        let f = fixture().await;

        let err = f
            .service
            .add(f.user_id + 100, FavoriteTarget::Planet(f.planet_id))
            .await
            .unwrap_err();
        assert!(matches!(err, FavoriteError::UserNotFound(_)));

        let err = f
            .service
            .add(f.user_id, FavoriteTarget::Character(999))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FavoriteError::TargetNotFound(FavoriteTarget::Character(999))
        ));

        let err = f.service.list_for_user(404).await.unwrap_err();
        assert!(matches!(err, FavoriteError::UserNotFound(404)));
    }

    #[tokio::test]
    async fn test_remove_missing_favorite() {
        let f = fixture().await;
        let err = f
            .service
            .remove(f.user_id, FavoriteTarget::Planet(f.planet_id))
            .await
            .unwrap_err();
        assert!(matches!(err, FavoriteError::NotFavorited { .. }));
    }

    #[tokio::test]
    async fn test_remove_with_duplicate_rows_is_ambiguous() {
        let f = fixture().await;
        let target = FavoriteTarget::Planet(f.planet_id);

        // Rows written before the unique index existed.
        f.store
            .conn
            .execute_unprepared("DROP INDEX idx_favorite_planets_user_planet")
            .await
            .unwrap();
        f.store
            .add_favorite_planet(f.user_id, f.planet_id)
            .await
            .unwrap();
        f.store
            .add_favorite_planet(f.user_id, f.planet_id)
            .await
            .unwrap();

        let err = f.service.remove(f.user_id, target).await.unwrap_err();
        assert!(matches!(err, FavoriteError::Ambiguous { count: 2, .. }));
        assert_eq!(
            ApiError::from(err).into_response().status(),
            StatusCode::CONFLICT
        );

        let rows = f
            .store
            .find_favorite_planet(f.user_id, f.planet_id)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_already_favorited() {
        let f = fixture().await;
        let target = FavoriteTarget::Planet(f.planet_id);

        f.store
            .add_favorite_planet(f.user_id, f.planet_id)
            .await
            .unwrap();
        let err = f
            .store
            .add_favorite_planet(f.user_id, f.planet_id)
            .await
            .unwrap_err();

        let mapped = map_insert_error(err, f.user_id, target);
        assert!(matches!(
            mapped,
            FavoriteError::AlreadyFavorited { user_id, target: t } if user_id == f.user_id && t == target
        ));
        assert_eq!(
            ApiError::from(mapped).into_response().status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_other_insert_errors_stay_database_errors() {
        let mapped = map_insert_error(
            anyhow::anyhow!("disk I/O error"),
            1,
            FavoriteTarget::Character(1),
        );
        assert!(matches!(mapped, FavoriteError::Database(_)));
    }

    #[test]
    fn test_target_display() {
        assert_eq!(FavoriteTarget::Planet(3).to_string(), "Planet 3");
        assert_eq!(
            FavoriteError::TargetNotFound(FavoriteTarget::Character(7)).to_string(),
            "Character 7 not found"
        );
    }
}
