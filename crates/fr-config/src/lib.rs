//! # fr-config
//!
//! Layered settings for the Fritter binary:
//! built-in defaults, then `config/fritter.toml` (optional), then
//! `FRITTER__<SECTION>__<KEY>` environment variables.

use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

/// Path of the optional settings file, without extension.
pub const DEFAULT_FILE: &str = "config/fritter";
pub const ENV_PREFIX: &str = "FRITTER";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub log: LogSettings,
    #[serde(default)]
    pub cors: CorsSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// 0 lets actix pick one worker per core.
    pub workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Default `env_logger` filter; `RUST_LOG` still wins.
    pub level: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsSettings {
    /// `None` allows any origin.
    pub allowed_origin: Option<String>,
}

/// Loads `.env` into the process environment, returning the file used.
///
/// Runs before logging is initialised, so the caller reports the outcome.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    found(dotenvy::dotenv())
}

fn found(result: Result<PathBuf, dotenvy::Error>) -> Result<Option<PathBuf>, dotenvy::Error> {
    match result {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

impl Settings {
    /// Loads the default settings file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = defaults()?
            .add_source(File::with_name(DEFAULT_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Defaults overlaid with an inline TOML document.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let settings = defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("server.workers", 0)?
        .set_default("database.url", "sqlite:fritter.db")?
        .set_default("database.max_connections", 5)?
        .set_default("log.level", "info")
}
