pub use super::characters::Entity as Characters;
pub use super::favorite_characters::Entity as FavoriteCharacters;
pub use super::favorite_planets::Entity as FavoritePlanets;
pub use super::planets::Entity as Planets;
pub use super::users::Entity as Users;
