//! Seed command handler
//!
//! Catalog rows have no HTTP write path; this is how they get in.

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use crate::config::{Config, SecurityConfig};
use crate::db::{NewCharacter, NewPlanet, Store};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    pub users: Vec<SeedUser>,
    pub planets: Vec<NewPlanet>,
    pub characters: Vec<NewCharacter>,
}

#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub skipped_users: usize,
    pub planets: usize,
    pub skipped_planets: usize,
    pub characters: usize,
    pub skipped_characters: usize,
}

impl SeedFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse seed file: {}", path.display()))
    }
}

/// Inserts everything in `seed`. Users are keyed by email and catalog rows by
/// name; existing ones are skipped, so seeding twice is harmless.
pub async fn seed_store(
    store: &Store,
    seed: SeedFile,
    security: &SecurityConfig,
) -> anyhow::Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for user in seed.users {
        if store
            .get_user_by_email_with_password(&user.email)
            .await?
            .is_some()
        {
            warn!("User {} already exists, skipping", user.email);
            summary.skipped_users += 1;
            continue;
        }
        store
            .create_user(&user.email, &user.password, security)
            .await?;
        summary.users += 1;
    }

    for planet in seed.planets {
        if store.find_planet_by_name(&planet.name).await?.is_some() {
            warn!("Planet {} already exists, skipping", planet.name);
            summary.skipped_planets += 1;
            continue;
        }
        store.create_planet(planet).await?;
        summary.planets += 1;
    }

    for character in seed.characters {
        if store.find_character_by_name(&character.name).await?.is_some() {
            warn!("Character {} already exists, skipping", character.name);
            summary.skipped_characters += 1;
            continue;
        }
        store.create_character(character).await?;
        summary.characters += 1;
    }

    Ok(summary)
}

pub async fn cmd_seed(config: &Config, path: &Path) -> anyhow::Result<()> {
    let seed = SeedFile::load(path)?;
    let store = Store::from_config(&config.database).await?;

    let summary = seed_store(&store, seed, &config.security).await?;

    println!(
        "Seeded {} users ({} skipped), {} planets ({} skipped), {} characters ({} skipped)",
        summary.users,
        summary.skipped_users,
        summary.planets,
        summary.skipped_planets,
        summary.characters,
        summary.skipped_characters
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_file() {
        let seed: SeedFile = toml::from_str(
            r#"
            [[users]]
            email = "rey@resistance.org"
            password = "jakku"

            [[planets]]
            name = "Jakku"
            climate = "arid"
            terrain = "deserts"

            [[characters]]
            name = "Rey"
            height = 170
            "#,
        )
        .unwrap();

        assert_eq!(seed.users.len(), 1);
        assert_eq!(seed.planets[0].population, None);
        assert_eq!(seed.characters[0].height, Some(170));
        assert_eq!(seed.characters[0].gender, "");
    }

    #[test]
    fn test_empty_seed_file() {
        let seed: SeedFile = toml::from_str("").unwrap();
        assert!(seed.users.is_empty());
        assert!(seed.planets.is_empty());
        assert!(seed.characters.is_empty());
    }
}
