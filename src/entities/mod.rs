pub mod prelude;

pub mod characters;
pub mod favorite_characters;
pub mod favorite_planets;
pub mod planets;
pub mod users;
