//! Process bootstrap: connect to storage, bind the movies collection, serve.

use crate::api;
use crate::config::AppConfig;
use crate::dao::{MOVIES_COLLECTION, MovieBinding, MoviesDao};
use crate::errors::StorageError;
use crate::storage::{Backend, MemoryEngine, MongoConnection, StorageConnection, memory::seed_from_path};
use std::sync::Arc;

/// Builds the storage connection the configured URI selects.
///
/// For the embedded backend this also creates the text index on `title` and
/// loads `seed_path` into the movies collection when configured.
///
/// # Errors
/// Fails when the URI is missing or unusable, or the seed file cannot be loaded.
pub async fn connect(config: &AppConfig) -> Result<Arc<dyn StorageConnection>, Box<dyn std::error::Error>> {
    let uri = config.db_uri()?;
    match Backend::from_uri(uri) {
        Backend::Memory => {
            let engine = MemoryEngine::new();
            // Name errors are left for bind_movies, which honours strict_bind.
            match config.namespace.as_deref().map(|ns| engine.collection_handle(ns, MOVIES_COLLECTION)) {
                Some(Ok(movies)) => {
                    movies.create_text_index(&["title"]);
                    if let Some(path) = &config.seed_path {
                        seed_from_path(&movies, path)?;
                    }
                }
                Some(Err(e)) => log::warn!("skipping text index and seed: {e}"),
                None if config.seed_path.is_some() => log::warn!("seed file ignored: no database name configured"),
                None => {}
            }
            log::info!("using embedded storage engine");
            let conn: Arc<dyn StorageConnection> = Arc::new(engine);
            Ok(conn)
        }
        Backend::Mongo(uri) => {
            if config.seed_path.is_some() {
                log::warn!("seed file ignored: only the embedded engine can be seeded");
            }
            let conn: Arc<dyn StorageConnection> = Arc::new(MongoConnection::connect(&uri).await?);
            Ok(conn)
        }
    }
}

/// Binds a fresh [`MovieBinding`] to `conn` and wraps it in a DAO.
///
/// # Errors
/// With `strict_bind` set, a bind failure is returned; otherwise it is logged
/// and queries answer with empty pages until storage is reachable.
pub fn bind_movies(config: &AppConfig, conn: &dyn StorageConnection) -> Result<MoviesDao, StorageError> {
    let binding = Arc::new(MovieBinding::new(config.namespace.clone()));
    if config.strict_bind() {
        binding.try_bind(conn)?;
    } else {
        binding.bind(conn);
    }
    Ok(MoviesDao::new(binding))
}

/// Connects, binds, and serves HTTP until Ctrl-C.
///
/// # Errors
/// Fails on connection, strict bind, or listener errors.
pub async fn run(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let conn = connect(config).await?;
    let dao = bind_movies(config, conn.as_ref())?;
    let app = api::router(dao);

    let addr = format!("{}:{}", config.host(), config.port());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("listening on port {}", config.port());
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    log::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("shutdown signal received");
}
