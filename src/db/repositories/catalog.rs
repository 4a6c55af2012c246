use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use tracing::info;

use crate::entities::{characters, planets, prelude::*};

pub type Planet = planets::Model;
pub type Character = characters::Model;

/// Planet fields as supplied by seed fixtures
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlanet {
    pub name: String,
    #[serde(default)]
    pub climate: String,
    #[serde(default)]
    pub terrain: String,
    pub population: Option<i64>,
    pub diameter: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCharacter {
    pub name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub birth_year: String,
    pub height: Option<i32>,
    #[serde(default)]
    pub eye_color: String,
    #[serde(default)]
    pub hair_color: String,
}

/// Read access to planets and characters, plus inserts for seeding.
pub struct CatalogRepository {
    conn: DatabaseConnection,
}

impl CatalogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Planets
    // ========================================================================

    pub async fn list_planets(&self) -> Result<Vec<Planet>> {
        Planets::find()
            .order_by_asc(planets::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list planets")
    }

    pub async fn get_planet(&self, id: i32) -> Result<Option<Planet>> {
        Planets::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query planet by ID")
    }

    pub async fn find_planet_by_name(&self, name: &str) -> Result<Option<Planet>> {
        Planets::find()
            .filter(planets::Column::Name.eq(name))
            .order_by_asc(planets::Column::Id)
            .one(&self.conn)
            .await
            .context("Failed to query planet by name")
    }

    pub async fn create_planet(&self, planet: NewPlanet) -> Result<Planet> {
        let active = planets::ActiveModel {
            name: Set(planet.name),
            climate: Set(planet.climate),
            terrain: Set(planet.terrain),
            population: Set(planet.population),
            diameter: Set(planet.diameter),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert planet")?;
        info!("Added planet {}: {}", model.id, model.name);
        Ok(model)
    }

    // ========================================================================
    // Characters
    // ========================================================================

    pub async fn list_characters(&self) -> Result<Vec<Character>> {
        Characters::find()
            .order_by_asc(characters::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list characters")
    }

    pub async fn get_character(&self, id: i32) -> Result<Option<Character>> {
        Characters::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query character by ID")
    }

    pub async fn find_character_by_name(&self, name: &str) -> Result<Option<Character>> {
        Characters::find()
            .filter(characters::Column::Name.eq(name))
            .order_by_asc(characters::Column::Id)
            .one(&self.conn)
            .await
            .context("Failed to query character by name")
    }

    pub async fn create_character(&self, character: NewCharacter) -> Result<Character> {
        let active = characters::ActiveModel {
            name: Set(character.name),
            gender: Set(character.gender),
            birth_year: Set(character.birth_year),
            height: Set(character.height),
            eye_color: Set(character.eye_color),
            hair_color: Set(character.hair_color),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert character")?;
        info!("Added character {}: {}", model.id, model.name);
        Ok(model)
    }
}
