use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // Collapse duplicate pairs onto their oldest row before the index goes on.
        db.execute_unprepared(
            "DELETE FROM favorite_planets WHERE id NOT IN \
             (SELECT MIN(id) FROM favorite_planets GROUP BY user_id, planet_id)",
        )
        .await?;
        db.execute_unprepared(
            "DELETE FROM favorite_characters WHERE id NOT IN \
             (SELECT MIN(id) FROM favorite_characters GROUP BY user_id, character_id)",
        )
        .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_favorite_planets_user_planet")
                    .table(FavoritePlanets::Table)
                    .col(FavoritePlanets::UserId)
                    .col(FavoritePlanets::PlanetId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_favorite_characters_user_character")
                    .table(FavoriteCharacters::Table)
                    .col(FavoriteCharacters::UserId)
                    .col(FavoriteCharacters::CharacterId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_favorite_characters_user_character")
                    .table(FavoriteCharacters::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_favorite_planets_user_planet")
                    .table(FavoritePlanets::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum FavoritePlanets {
    Table,
    UserId,
    PlanetId,
}

#[derive(DeriveIden)]
enum FavoriteCharacters {
    Table,
    UserId,
    CharacterId,
}
