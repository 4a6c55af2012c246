//! Read-only catalog endpoints for characters, planets and users.

use axum::{Json, extract::State};
use std::sync::Arc;

use super::extract::ValidId;
use super::{ApiError, AppState, CharacterDto, PlanetDto, UserDto};

/// GET /character
pub async fn list_characters(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CharacterDto>>, ApiError> {
    let characters = state.store().list_characters().await?;
    Ok(Json(characters.into_iter().map(CharacterDto::from).collect()))
}

/// GET /character/{id}
pub async fn get_character(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<CharacterDto>, ApiError> {
    let character = state
        .store()
        .get_character(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Character", id))?;

    Ok(Json(CharacterDto::from(character)))
}

/// GET /planet
pub async fn list_planets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PlanetDto>>, ApiError> {
    let planets = state.store().list_planets().await?;
    Ok(Json(planets.into_iter().map(PlanetDto::from).collect()))
}

/// GET /planet/{id}
pub async fn get_planet(
    State(state): State<Arc<AppState>>,
    ValidId(id): ValidId,
) -> Result<Json<PlanetDto>, ApiError> {
    let planet = state
        .store()
        .get_planet(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Planet", id))?;

    Ok(Json(PlanetDto::from(planet)))
}

/// GET /user
pub async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = state.store().list_users().await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}
