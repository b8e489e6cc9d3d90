//! Application configuration.
//!
//! Precedence: CLI > env > config files > defaults. Every field is optional
//! so layers can be merged field by field; accessors apply the defaults.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_LOG_LEVEL: &str = "info";
const CONFIG_FILE_NAME: &str = "moviereviews.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub db_uri: Option<String>,
    /// Database holding the `movies` collection.
    pub namespace: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_config: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    /// Abort startup when the movies collection cannot be bound.
    pub strict_bind: Option<bool>,
    /// JSON/NDJSON fixture loaded into the embedded backend.
    pub seed_path: Option<PathBuf>,
}

impl AppConfig {
    /// Fills every unset field from `other`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self {
            db_uri: self.db_uri.or(other.db_uri),
            namespace: self.namespace.or(other.namespace),
            host: self.host.or(other.host),
            port: self.port.or(other.port),
            log_config: self.log_config.or(other.log_config),
            log_dir: self.log_dir.or(other.log_dir),
            log_level: self.log_level.or(other.log_level),
            strict_bind: self.strict_bind.or(other.strict_bind),
            seed_path: self.seed_path.or(other.seed_path),
        }
    }

    /// Builds the environment layer through `get`, so callers (and tests) can
    /// supply something other than the process environment.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` when `PORT` or
    /// `MOVIEREVIEWS_STRICT_BIND` cannot be parsed.
    pub fn from_env_with<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| get(k).filter(|v| !v.trim().is_empty());
        Ok(Self {
            db_uri: non_empty("MOVIEREVIEWS_DB_URI"),
            namespace: non_empty("MOVIEREVIEWS_NS"),
            host: non_empty("HOST"),
            port: non_empty("PORT").map(|v| parse_value("PORT", &v)).transpose()?,
            log_config: non_empty("MOVIEREVIEWS_LOG_CONFIG").map(PathBuf::from),
            log_dir: non_empty("MOVIEREVIEWS_LOG_DIR").map(PathBuf::from),
            log_level: non_empty("MOVIEREVIEWS_LOG_LEVEL"),
            strict_bind: non_empty("MOVIEREVIEWS_STRICT_BIND").map(|v| parse_bool("MOVIEREVIEWS_STRICT_BIND", &v)).transpose()?,
            seed_path: non_empty("MOVIEREVIEWS_SEED").map(PathBuf::from),
        })
    }

    /// # Errors
    /// See [`from_env_with`](Self::from_env_with).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Parses one TOML file.
    ///
    /// # Errors
    /// Returns `ConfigError::Read` or `ConfigError::Parse` naming the file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })
    }

    /// Merges the existing files among `paths`, earlier paths winning.
    ///
    /// # Errors
    /// Propagates the first unreadable or malformed file.
    pub fn from_files(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        for p in paths.iter().filter(|p| p.exists()) {
            log::debug!("loading config file {}", p.display());
            cfg = cfg.or(Self::from_toml_file(p)?);
        }
        Ok(cfg)
    }

    /// Loads `.env`, then layers `cli` over the environment over config files.
    ///
    /// # Errors
    /// Propagates environment and file errors.
    pub fn load(cli: Self, cli_config: Option<&Path>) -> Result<Self, ConfigError> {
        // A missing .env is normal; real env vars are never overridden.
        let _ = dotenvy::dotenv();
        let env = Self::from_env()?;
        let env_config = std::env::var("MOVIEREVIEWS_CONFIG").ok().map(PathBuf::from);
        let files = Self::from_files(&config_paths(cli_config, env_config.as_deref()))?;
        Ok(cli.or(env).or(files))
    }

    /// # Errors
    /// Returns `ConfigError::MissingDbUri` when no URI was configured anywhere.
    pub fn db_uri(&self) -> Result<&str, ConfigError> {
        self.db_uri.as_deref().ok_or(ConfigError::MissingDbUri)
    }

    #[must_use]
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    #[must_use]
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    #[must_use]
    pub fn strict_bind(&self) -> bool {
        self.strict_bind.unwrap_or(false)
    }
}

/// Candidate config files in precedence order.
#[must_use]
pub fn config_paths(cli_config: Option<&Path>, env_config: Option<&Path>) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = vec![];
    if let Some(p) = cli_config {
        paths.push(p.to_path_buf());
    }
    if let Some(p) = env_config {
        paths.push(p.to_path_buf());
    }
    if let Some(dir) = dirs_next::config_dir() {
        paths.push(dir.join(CONFIG_FILE_NAME));
    }
    if let Ok(cur) = std::env::current_dir() {
        paths.push(cur.join(CONFIG_FILE_NAME));
    }
    paths
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue { key: key.to_string(), value: value.to_string() })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key: key.to_string(), value: value.to_string() }),
    }
}
