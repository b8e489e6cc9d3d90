use crate::errors::StorageError;
use crate::storage::{MovieCollection, StorageConnection, validate_collection_name, validate_database_name};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::collection::MemoryCollection;

type Collections = HashMap<String, Arc<MemoryCollection>>;

/// The embedded engine: named databases holding named collections, all in
/// memory. Databases and collections spring into existence on first use.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    databases: RwLock<HashMap<String, Collections>>,
}

impl MemoryEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the named collection, creating it (and its database) if missing.
    ///
    /// # Errors
    /// Returns an error when either name is invalid.
    pub fn collection_handle(&self, database: &str, collection: &str) -> Result<Arc<MemoryCollection>, StorageError> {
        validate_database_name(database)?;
        validate_collection_name(collection)?;
        if let Some(col) = self.databases.read().get(database).and_then(|db| db.get(collection)) {
            return Ok(col.clone());
        }
        let mut dbs = self.databases.write();
        let col = dbs
            .entry(database.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_insert_with(|| Arc::new(MemoryCollection::new(format!("{database}.{collection}"))))
            .clone();
        Ok(col)
    }

    #[must_use]
    pub fn list_database_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.databases.read().keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn list_collection_names(&self, database: &str) -> Vec<String> {
        let mut names: Vec<String> =
            self.databases.read().get(database).map(|db| db.keys().cloned().collect()).unwrap_or_default();
        names.sort();
        names
    }
}

impl StorageConnection for MemoryEngine {
    fn collection(&self, database: &str, collection: &str) -> Result<Arc<dyn MovieCollection>, StorageError> {
        let col: Arc<dyn MovieCollection> = self.collection_handle(database, collection)?;
        Ok(col)
    }
}
