//! # rf-config
//!
//! Layered runtime settings. Later layers win:
//!
//! 1. built-in defaults
//! 2. `config/rusty-forum.toml` (optional)
//! 3. `.env` (loaded into the process environment by `dotenvy`)
//! 4. `RUSTY_FORUM_*` environment variables, `__` between nested keys,
//!    e.g. `RUSTY_FORUM_DATABASE__URL` or `RUSTY_FORUM_PAGINATION__POSTS_PER_PAGE`.

use std::collections::HashMap;

use config::{Config, Environment, File, FileFormat};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

pub const DEFAULT_CONFIG_FILE: &str = "config/rusty-forum";
pub const ENV_PREFIX: &str = "RUSTY_FORUM";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not load settings: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub pagination: PaginationSettings,
    pub auth: AuthSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub listen: String,
    /// Set the `Secure` attribute on the session cookie. Needs TLS in front.
    pub secure_cookies: bool,
    pub static_dir: String,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    #[serde(deserialize_with = "secret_string")]
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationSettings {
    pub topics_per_page: i64,
    pub posts_per_page: i64,
}

/// Argon2id work factors.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` overrides it.
    pub filter: String,
    pub json: bool,
}

fn secret_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    Config::builder()
        .set_default("server.listen", "127.0.0.1:8080")?
        .set_default("server.secure_cookies", false)?
        .set_default("server.static_dir", "static")?
        .set_default("database.url", "sqlite://rusty_forum.db")?
        .set_default("database.max_connections", 5_i64)?
        .set_default("pagination.topics_per_page", 10_i64)?
        .set_default("pagination.posts_per_page", 10_i64)?
        .set_default("auth.memory_kib", 19_456_i64)?
        .set_default("auth.iterations", 2_i64)?
        .set_default("auth.parallelism", 1_i64)?
        .set_default("log.filter", "info,tower_http=debug,sqlx=warn")?
        .set_default("log.json", false)
}

impl Settings {
    /// Loads `.env`, then layers the default file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env"),
        }

        let settings = defaults()?
            .add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false))
            .add_source(env_source(None))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()
    }

    /// Builds settings from an inline TOML document and an explicit
    /// environment map instead of the process environment.
    pub fn from_sources(
        toml: &str,
        env: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let settings = defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .add_source(env_source(Some(env)))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "database.max_connections",
                reason: "must be at least 1".into(),
            });
        }
        if self.pagination.topics_per_page < 1 {
            return Err(ConfigError::Invalid {
                key: "pagination.topics_per_page",
                reason: "must be at least 1".into(),
            });
        }
        if self.pagination.posts_per_page < 1 {
            return Err(ConfigError::Invalid {
                key: "pagination.posts_per_page",
                reason: "must be at least 1".into(),
            });
        }
        Ok(self)
    }
}

fn env_source(source: Option<HashMap<String, String>>) -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .source(source)
}
