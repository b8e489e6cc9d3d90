//! Storage seam between the movies DAO and a document database.
//!
//! A [`StorageConnection`] resolves a named database/collection pair into a
//! [`MovieCollection`] handle. Two backends exist: the MongoDB driver
//! ([`mongo::MongoConnection`]) and the embedded in-process engine
//! ([`memory::MemoryEngine`]). The URI scheme picks one.

pub mod memory;
pub mod mongo;

use crate::errors::StorageError;
use async_trait::async_trait;
use bson::Document;
use std::sync::Arc;

pub use memory::MemoryEngine;
pub use mongo::MongoConnection;

/// URI scheme selecting the embedded backend.
pub const MEMORY_SCHEME: &str = "memory://";

const MAX_DATABASE_NAME_LEN: usize = 64;
const DATABASE_NAME_FORBIDDEN: &[char] = &['/', '\\', '.', ' ', '"', '$', '\0'];

/// A live connection able to resolve collection handles.
///
/// Resolution is synchronous and performs no I/O; it only validates names and
/// hands back a handle. Errors surface at query time otherwise.
pub trait StorageConnection: Send + Sync {
    fn collection(&self, database: &str, collection: &str) -> Result<Arc<dyn MovieCollection>, StorageError>;
}

/// Read operations the query service issues against a bound collection.
///
/// `skip` must be non-negative. `limit` follows driver semantics: `0` means no
/// limit and a negative value returns at most `|limit|` documents.
#[async_trait]
pub trait MovieCollection: Send + Sync {
    async fn find_page(&self, query: &Document, skip: i64, limit: i64) -> Result<Vec<Document>, StorageError>;

    async fn count(&self, query: &Document) -> Result<u64, StorageError>;

    /// Fully qualified `database.collection` name, for logs.
    fn namespace(&self) -> String;
}

/// Which backend a URI selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Mongo(String),
}

impl Backend {
    #[must_use]
    pub fn from_uri(uri: &str) -> Self {
        if uri.starts_with(MEMORY_SCHEME) {
            Self::Memory
        } else {
            Self::Mongo(uri.to_string())
        }
    }
}

/// # Errors
/// Returns `StorageError::InvalidDatabaseName` when the name is empty, too long,
/// or contains a character MongoDB rejects in database names.
pub fn validate_database_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() {
        return Err(StorageError::InvalidDatabaseName("name is empty".into()));
    }
    if name.len() >= MAX_DATABASE_NAME_LEN {
        return Err(StorageError::InvalidDatabaseName(format!("'{name}' exceeds {} bytes", MAX_DATABASE_NAME_LEN - 1)));
    }
    if let Some(c) = name.chars().find(|c| DATABASE_NAME_FORBIDDEN.contains(c)) {
        return Err(StorageError::InvalidDatabaseName(format!("'{name}' contains {c:?}")));
    }
    Ok(())
}

/// # Errors
/// Returns `StorageError::InvalidCollectionName` for empty names, names with `$`
/// or NUL, and reserved `system.` names.
pub fn validate_collection_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() {
        return Err(StorageError::InvalidCollectionName("name is empty".into()));
    }
    if name.contains('$') || name.contains('\0') {
        return Err(StorageError::InvalidCollectionName(format!("'{name}' contains a reserved character")));
    }
    if name.starts_with("system.") {
        return Err(StorageError::InvalidCollectionName(format!("'{name}' is reserved")));
    }
    Ok(())
}

/// Rejects negative skips before they reach a backend.
pub(crate) fn checked_skip(skip: i64) -> Result<u64, StorageError> {
    u64::try_from(skip).map_err(|_| StorageError::InvalidArgument(format!("skip value must be non-negative, got {skip}")))
}
