//! Migrate command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_migrate(config: &Config) -> anyhow::Result<()> {
    // Connecting runs every pending migration.
    let store = Store::from_config(&config.database).await?;
    store.ping().await?;

    println!("Database is up to date.");
    Ok(())
}
