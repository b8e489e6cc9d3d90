use thiserror::Error;

/// Failures raised by the storage layer and the collection binder.
///
/// None of these cross the public boundary of [`crate::dao::MoviesDao::get_movies`];
/// they are logged there and collapsed into an empty page.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database name is not configured")]
    MissingDatabaseName,

    #[error("Invalid database name: {0}")]
    InvalidDatabaseName(String),

    #[error("Invalid collection name: {0}")]
    InvalidCollectionName(String),

    #[error("Collection handle is not bound")]
    NotBound,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("text index required for $text query")]
    TextIndexRequired,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("MongoDB: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

/// Problems found while assembling [`crate::config::AppConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Database URI is not configured (set MOVIEREVIEWS_DB_URI or --uri)")]
    MissingDbUri,
}
