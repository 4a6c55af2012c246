pub mod auth_service;
pub mod auth_service_impl;
pub mod favorite_service;
pub mod favorite_service_impl;
pub mod token;

pub use auth_service::{AuthError, AuthService, LoginResult};
pub use auth_service_impl::SeaOrmAuthService;
pub use favorite_service::{FavoriteError, FavoriteService, FavoriteTarget, UserFavorites};
pub use favorite_service_impl::SeaOrmFavoriteService;
pub use token::{Claims, TokenError, TokenSigner};
