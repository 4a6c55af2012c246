mod migrate;
mod seed;

pub use migrate::cmd_migrate;
pub use seed::{SeedFile, SeedSummary, SeedUser, cmd_seed, seed_store};
