use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, FavoriteService, SeaOrmAuthService, SeaOrmFavoriteService, TokenSigner,
};

pub mod auth;
mod catalog;
mod error;
mod extract;
mod favorites;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,

    pub config: Arc<Config>,

    pub favorite_service: Arc<dyn FavoriteService>,

    pub auth_service: Arc<dyn AuthService>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn favorite_service(&self) -> &Arc<dyn FavoriteService> {
        &self.favorite_service
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.auth_service
    }
}

#[must_use]
pub fn create_app_state(store: Store, config: Config) -> Arc<AppState> {
    let signer = TokenSigner::new(
        &config.security.jwt_secret,
        chrono::Duration::minutes(config.security.token_ttl_minutes),
    );

    let favorite_service = Arc::new(SeaOrmFavoriteService::new(store.clone()))
        as Arc<dyn FavoriteService>;
    let auth_service = Arc::new(SeaOrmAuthService::new(store.clone(), signer))
        as Arc<dyn AuthService>;

    Arc::new(AppState {
        store,
        config: Arc::new(config),
        favorite_service,
        auth_service,
    })
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::from_config(&config.database).await?;
    Ok(create_app_state(store, config))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/character", get(catalog::list_characters))
        .route("/character/{id}", get(catalog::get_character))
        .route("/planet", get(catalog::list_planets))
        .route("/planet/{id}", get(catalog::get_planet))
        .route("/user", get(catalog::list_users))
        .route("/users/{id}/favorites", get(favorites::get_user_favorites))
        .route(
            "/favorite/planet/{id}",
            post(favorites::add_favorite_planet).delete(favorites::delete_favorite_planet),
        )
        .route(
            "/favorite/people/{id}",
            post(favorites::add_favorite_people).delete(favorites::delete_favorite_people),
        )
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .fallback(route_not_found)
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

async fn route_not_found(uri: axum::http::Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
