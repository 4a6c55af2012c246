use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::catalog::{Character, Planet};
use crate::entities::{favorite_characters, favorite_planets, prelude::*};

pub type FavoritePlanet = favorite_planets::Model;
pub type FavoriteCharacter = favorite_characters::Model;

/// Repository for the user/planet and user/character join rows
pub struct FavoriteRepository {
    conn: DatabaseConnection,
}

impl FavoriteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Planets the user has favorited, oldest favorite first. Rows whose
    /// planet no longer resolves are skipped.
    pub async fn planets_for_user(&self, user_id: i32) -> Result<Vec<Planet>> {
        let rows = FavoritePlanets::find()
            .filter(favorite_planets::Column::UserId.eq(user_id))
            .order_by_asc(favorite_planets::Column::Id)
            .find_also_related(Planets)
            .all(&self.conn)
            .await
            .context("Failed to load favorite planets")?;

        Ok(rows.into_iter().filter_map(|(_, planet)| planet).collect())
    }

    pub async fn characters_for_user(&self, user_id: i32) -> Result<Vec<Character>> {
        let rows = FavoriteCharacters::find()
            .filter(favorite_characters::Column::UserId.eq(user_id))
            .order_by_asc(favorite_characters::Column::Id)
            .find_also_related(Characters)
            .all(&self.conn)
            .await
            .context("Failed to load favorite characters")?;

        Ok(rows
            .into_iter()
            .filter_map(|(_, character)| character)
            .collect())
    }

    pub async fn find_planet(&self, user_id: i32, planet_id: i32) -> Result<Vec<FavoritePlanet>> {
        FavoritePlanets::find()
            .filter(favorite_planets::Column::UserId.eq(user_id))
            .filter(favorite_planets::Column::PlanetId.eq(planet_id))
            .all(&self.conn)
            .await
            .context("Failed to query favorite planet")
    }

    pub async fn find_character(
        &self,
        user_id: i32,
        character_id: i32,
    ) -> Result<Vec<FavoriteCharacter>> {
        FavoriteCharacters::find()
            .filter(favorite_characters::Column::UserId.eq(user_id))
            .filter(favorite_characters::Column::CharacterId.eq(character_id))
            .all(&self.conn)
            .await
            .context("Failed to query favorite character")
    }

    pub async fn add_planet(&self, user_id: i32, planet_id: i32) -> Result<FavoritePlanet> {
        let active = favorite_planets::ActiveModel {
            user_id: Set(user_id),
            planet_id: Set(planet_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert favorite planet")
    }

    pub async fn add_character(&self, user_id: i32, character_id: i32) -> Result<FavoriteCharacter> {
        let active = favorite_characters::ActiveModel {
            user_id: Set(user_id),
            character_id: Set(character_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert favorite character")
    }

    pub async fn remove_planet(&self, favorite_id: i32) -> Result<bool> {
        let result = FavoritePlanets::delete_by_id(favorite_id)
            .exec(&self.conn)
            .await
            .context("Failed to delete favorite planet")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn remove_character(&self, favorite_id: i32) -> Result<bool> {
        let result = FavoriteCharacters::delete_by_id(favorite_id)
            .exec(&self.conn)
            .await
            .context("Failed to delete favorite character")?;

        Ok(result.rows_affected > 0)
    }
}
