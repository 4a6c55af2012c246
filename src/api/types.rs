use serde::{Deserialize, Serialize};

use crate::db::{Character, Planet, User};

/// JSON body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub msg: String,
}

impl ErrorBody {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub is_active: bool,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanetDto {
    pub id: i32,
    pub name: String,
    pub climate: String,
    pub terrain: String,
    pub population: Option<i64>,
    pub diameter: Option<i32>,
}

impl From<Planet> for PlanetDto {
    fn from(planet: Planet) -> Self {
        Self {
            id: planet.id,
            name: planet.name,
            climate: planet.climate,
            terrain: planet.terrain,
            population: planet.population,
            diameter: planet.diameter,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CharacterDto {
    pub id: i32,
    pub name: String,
    pub gender: String,
    pub birth_year: String,
    pub height: Option<i32>,
    pub eye_color: String,
    pub hair_color: String,
}

impl From<Character> for CharacterDto {
    fn from(character: Character) -> Self {
        Self {
            id: character.id,
            name: character.name,
            gender: character.gender,
            birth_year: character.birth_year,
            height: character.height,
            eye_color: character.eye_color,
            hair_color: character.hair_color,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FavoritesDto {
    pub user_id: i32,
    pub favorite_characters: Vec<CharacterDto>,
    pub favorite_planets: Vec<PlanetDto>,
}

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    pub user_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteStatus {
    Added,
    Removed,
}

#[derive(Debug, Serialize)]
pub struct PlanetFavoriteResponse {
    pub planet_id: i32,
    pub status: FavoriteStatus,
}

#[derive(Debug, Serialize)]
pub struct PeopleFavoriteResponse {
    pub people_id: i32,
    pub status: FavoriteStatus,
}
