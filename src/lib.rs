pub mod api;
pub mod config;
pub mod dao;
pub mod errors;
pub mod logger;
pub mod server;
pub mod storage;

pub use crate::config::AppConfig;
pub use crate::dao::{FilterSpec, MovieBinding, MovieFilter, MoviesDao, PageRequest, PageResult};
pub use crate::errors::{ConfigError, StorageError};
pub use crate::storage::{MemoryEngine, MongoConnection, MovieCollection, StorageConnection};

/// Initializes logging from `config`.
///
/// Call once at startup, before connecting to storage.
pub fn init(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    logger::init_from(config)?;
    Ok(())
}
