use crate::errors::StorageError;
use crate::logger::METRICS_TARGET;
use crate::storage::{MovieCollection, StorageConnection};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// Collection every movie query runs against.
pub const MOVIES_COLLECTION: &str = "movies";

/// Write-once holder of the movies collection handle.
///
/// The first successful bind wins for the lifetime of the value; later binds
/// return before touching the connection. Share it behind an `Arc` between the
/// bootstrap that binds and the [`super::MoviesDao`] that reads.
pub struct MovieBinding {
    database: Option<String>,
    collection: String,
    handle: OnceCell<Arc<dyn MovieCollection>>,
}

impl fmt::Debug for MovieBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MovieBinding")
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl MovieBinding {
    /// `database` is the configured namespace; `None` makes every bind fail.
    #[must_use]
    pub fn new(database: Option<String>) -> Self {
        Self { database, collection: MOVIES_COLLECTION.to_string(), handle: OnceCell::new() }
    }

    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Resolves and stores the handle unless one is already set. Failures are
    /// logged and leave the binding unset; queries then fall back to empty pages.
    pub fn bind(&self, conn: &dyn StorageConnection) {
        if let Err(e) = self.try_bind(conn) {
            log::error!("Unable to establish collection handles in movies dao: {e}");
            log::warn!(target: METRICS_TARGET, "bind outcome=failed error=\"{e}\"");
        }
    }

    /// Like [`bind`](Self::bind) but reports the failure.
    ///
    /// Returns `Ok(true)` when this call set the handle and `Ok(false)` when a
    /// handle was already present.
    ///
    /// # Errors
    /// Returns the resolution error when no handle is set and the connection
    /// cannot resolve the configured database and collection.
    pub fn try_bind(&self, conn: &dyn StorageConnection) -> Result<bool, StorageError> {
        if self.handle.get().is_some() {
            log::debug!("movies collection already bound; ignoring bind");
            return Ok(false);
        }
        let mut resolved = false;
        self.handle.get_or_try_init(|| {
            let database = self.database.as_deref().ok_or(StorageError::MissingDatabaseName)?;
            let handle = conn.collection(database, &self.collection)?;
            resolved = true;
            Ok::<_, StorageError>(handle)
        })?;
        if resolved {
            let ns = self.handle.get().map(|h| h.namespace()).unwrap_or_default();
            log::info!("movies collection bound to {ns}");
            log::info!(target: METRICS_TARGET, "bind outcome=bound ns={ns}");
        }
        Ok(resolved)
    }

    #[must_use]
    pub fn handle(&self) -> Option<&Arc<dyn MovieCollection>> {
        self.handle.get()
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.handle.get().is_some()
    }

    #[must_use]
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }
}
