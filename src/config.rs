use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "HOLOCRON_CONFIG";

/// Environment variable overriding `security.jwt_secret`.
pub const JWT_SECRET_ENV: &str = "HOLOCRON_JWT_SECRET";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub database: DatabaseConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    /// File the config was read from, if any. Logged once tracing is up.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Emit logs as JSON lines instead of the human readable format
    pub json_logs: bool,

    /// Number of tokio worker threads (default: 0)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            worker_threads: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL. `DATABASE_URL` takes precedence when set.
    pub url: String,

    pub max_connections: u32,

    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data/holocron.db".to_string(),
            max_connections: 5,
            min_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind port. `PORT` takes precedence when set.
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// HMAC secret for access tokens. Generated at startup when left empty,
    /// which invalidates issued tokens on every restart.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub jwt_secret: String,

    pub token_ttl_minutes: i64,

    /// Argon2 memory cost in KiB
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_minutes: 15,
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
            return Self::load_from_path(Path::new(&explicit));
        }

        for path in &Self::config_paths() {
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.source = Some(path.to_path_buf());

        Ok(config)
    }

    pub fn log_source(&self) {
        match &self.source {
            Some(path) => info!("Loaded config from: {}", path.display()),
            None => info!("No config file found, using defaults"),
        }
    }

    /// Applies `DATABASE_URL`, `PORT` and the JWT secret variable on top of
    /// whatever the config file provided.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            self.database.url = normalize_database_url(url.trim());
        }

        if let Some(port) = lookup("PORT").filter(|v| !v.trim().is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {port}"))?;
        }

        if let Some(secret) = lookup(JWT_SECRET_ENV).filter(|v| !v.is_empty()) {
            self.security.jwt_secret = secret;
        }

        Ok(())
    }

    pub fn ensure_jwt_secret(&mut self) {
        if self.security.jwt_secret.is_empty() {
            warn!(
                "No JWT secret configured (set {JWT_SECRET_ENV}); generated an ephemeral one, tokens will not survive a restart"
            );
            self.security.jwt_secret = generate_secret();
        }
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("holocron").join("config.toml"));
        }

        paths
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be > 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!("database.min_connections cannot exceed database.max_connections");
        }

        if self.security.jwt_secret.is_empty() {
            anyhow::bail!("JWT secret cannot be empty");
        }

        if self.security.token_ttl_minutes <= 0 {
            anyhow::bail!("security.token_ttl_minutes must be > 0");
        }

        Ok(())
    }
}

/// Hosted Postgres providers hand out `postgres://` URLs; rewrite them to the
/// `postgresql://` scheme. Anything else passes through untouched.
#[must_use]
pub fn normalize_database_url(url: &str) -> String {
    match url.strip_prefix("postgres://") {
        Some(rest) => format!("postgresql://{rest}"),
        None => url.to_string(),
    }
}

/// Random 64 character hex secret
#[must_use]
pub fn generate_secret() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.url, "sqlite:data/holocron.db");
        assert_eq!(config.security.token_ttl_minutes, 15);
        assert!(config.security.jwt_secret.is_empty());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [server]
            port = 8080
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.server.port, 8080);

        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_load_from_path_records_source() {
        let path = std::env::temp_dir().join(format!("holocron-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[server]\nport = 4200\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.server.port, 4200);
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
        assert!(Config::default().source.is_none());
    }

    #[test]
    fn test_load_from_missing_path() {
        assert!(Config::load_from_path(Path::new("does/not/exist.toml")).is_err());
    }

    #[test]
    fn test_config_serialization_skips_empty_secret() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("[security]"));
        assert!(!toml_str.contains("jwt_secret"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[
                ("DATABASE_URL", "postgres://app:pw@db:5432/holocron"),
                ("PORT", "4100"),
                (JWT_SECRET_ENV, "shh"),
            ]))
            .unwrap();

        assert_eq!(config.database.url, "postgresql://app:pw@db:5432/holocron");
        assert_eq!(config.server.port, 4100);
        assert_eq!(config.security.jwt_secret, "shh");
    }

    #[test]
    fn test_env_overrides_reject_bad_port() {
        let mut config = Config::default();
        assert!(config.apply_env_overrides(env(&[("PORT", "http")])).is_err());
    }

    #[test]
    fn test_normalize_database_url() {
        assert_eq!(
            normalize_database_url("postgres://u@h/db"),
            "postgresql://u@h/db"
        );
        assert_eq!(
            normalize_database_url("postgresql://u@h/db"),
            "postgresql://u@h/db"
        );
        assert_eq!(
            normalize_database_url("sqlite:data/x.db"),
            "sqlite:data/x.db"
        );
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.security.jwt_secret = generate_secret();
        assert_eq!(config.security.jwt_secret.len(), 64);
        assert!(config.validate().is_ok());

        config.database.min_connections = 10;
        assert!(config.validate().is_err());
    }
}
