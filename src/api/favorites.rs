//! Favorites endpoints.
//!
//! Handlers only map HTTP to [`FavoriteService`] calls; existence and
//! uniqueness rules live in the service.
//!
//! [`FavoriteService`]: crate::services::FavoriteService

use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::extract::{ValidId, ValidJson};
use super::validation::validate_id;
use super::{
    ApiError, AppState, CharacterDto, FavoriteRequest, FavoriteStatus, FavoritesDto,
    PeopleFavoriteResponse, PlanetDto, PlanetFavoriteResponse,
};
use crate::services::{FavoriteError, FavoriteTarget};

impl From<FavoriteError> for ApiError {
    fn from(err: FavoriteError) -> Self {
        match err {
            FavoriteError::UserNotFound(id) => Self::not_found("User", id),
            FavoriteError::TargetNotFound(target) => Self::not_found(target.kind(), target.id()),
            e @ FavoriteError::NotFavorited { .. } => Self::NotFound(e.to_string()),
            e @ (FavoriteError::AlreadyFavorited { .. } | FavoriteError::Ambiguous { .. }) => {
                Self::conflict(e.to_string())
            }
            FavoriteError::Database(msg) => Self::database(msg),
        }
    }
}

/// GET /users/{id}/favorites
pub async fn get_user_favorites(
    State(state): State<Arc<AppState>>,
    ValidId(user_id): ValidId,
) -> Result<Json<FavoritesDto>, ApiError> {
    let favorites = state.favorite_service().list_for_user(user_id).await?;

    Ok(Json(FavoritesDto {
        user_id: favorites.user_id,
        favorite_characters: favorites
            .characters
            .into_iter()
            .map(CharacterDto::from)
            .collect(),
        favorite_planets: favorites.planets.into_iter().map(PlanetDto::from).collect(),
    }))
}

/// POST /favorite/planet/{id}
pub async fn add_favorite_planet(
    State(state): State<Arc<AppState>>,
    ValidId(planet_id): ValidId,
    ValidJson(payload): ValidJson<FavoriteRequest>,
) -> Result<(StatusCode, Json<PlanetFavoriteResponse>), ApiError> {
    let user_id = validate_id("user", payload.user_id)?;
    state
        .favorite_service()
        .add(user_id, FavoriteTarget::Planet(planet_id))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PlanetFavoriteResponse {
            planet_id,
            status: FavoriteStatus::Added,
        }),
    ))
}

/// POST /favorite/people/{id}
pub async fn add_favorite_people(
    State(state): State<Arc<AppState>>,
    ValidId(people_id): ValidId,
    ValidJson(payload): ValidJson<FavoriteRequest>,
) -> Result<(StatusCode, Json<PeopleFavoriteResponse>), ApiError> {
    let user_id = validate_id("user", payload.user_id)?;
    state
        .favorite_service()
        .add(user_id, FavoriteTarget::Character(people_id))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PeopleFavoriteResponse {
            people_id,
            status: FavoriteStatus::Added,
        }),
    ))
}

/// DELETE /favorite/planet/{id}
pub async fn delete_favorite_planet(
    State(state): State<Arc<AppState>>,
    ValidId(planet_id): ValidId,
    ValidJson(payload): ValidJson<FavoriteRequest>,
) -> Result<Json<PlanetFavoriteResponse>, ApiError> {
    let user_id = validate_id("user", payload.user_id)?;
    state
        .favorite_service()
        .remove(user_id, FavoriteTarget::Planet(planet_id))
        .await?;

    Ok(Json(PlanetFavoriteResponse {
        planet_id,
        status: FavoriteStatus::Removed,
    }))
}

/// DELETE /favorite/people/{id}
pub async fn delete_favorite_people(
    State(state): State<Arc<AppState>>,
    ValidId(people_id): ValidId,
    ValidJson(payload): ValidJson<FavoriteRequest>,
) -> Result<Json<PeopleFavoriteResponse>, ApiError> {
    let user_id = validate_id("user", payload.user_id)?;
    state
        .favorite_service()
        .remove(user_id, FavoriteTarget::Character(people_id))
        .await?;

    Ok(Json(PeopleFavoriteResponse {
        people_id,
        status: FavoriteStatus::Removed,
    }))
}
