use super::{MovieCollection, StorageConnection, checked_skip, validate_collection_name, validate_database_name};
use crate::errors::StorageError;
use async_trait::async_trait;
use bson::Document;
use futures::TryStreamExt;
use mongodb::{Client, Collection};
use std::sync::Arc;

/// Connection backed by the official MongoDB driver.
#[derive(Clone, Debug)]
pub struct MongoConnection {
    client: Client,
}

impl MongoConnection {
    /// Parses the URI and builds a client. The driver connects lazily, so an
    /// unreachable server only shows up on the first query.
    ///
    /// # Errors
    /// Returns `StorageError::Mongo` when the URI cannot be parsed or resolved.
    pub async fn connect(uri: &str) -> Result<Self, StorageError> {
        let client = Client::with_uri_str(uri).await?;
        log::info!("mongodb client created");
        Ok(Self { client })
    }

    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl StorageConnection for MongoConnection {
    fn collection(&self, database: &str, collection: &str) -> Result<Arc<dyn MovieCollection>, StorageError> {
        validate_database_name(database)?;
        validate_collection_name(collection)?;
        let inner = self.client.database(database).collection::<Document>(collection);
        let handle: Arc<dyn MovieCollection> = Arc::new(MongoCollection { inner });
        Ok(handle)
    }
}

struct MongoCollection {
    inner: Collection<Document>,
}

#[async_trait]
impl MovieCollection for MongoCollection {
    async fn find_page(&self, query: &Document, skip: i64, limit: i64) -> Result<Vec<Document>, StorageError> {
        let skip = checked_skip(skip)?;
        let cursor = self.inner.find(query.clone()).skip(skip).limit(limit).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count(&self, query: &Document) -> Result<u64, StorageError> {
        Ok(self.inner.count_documents(query.clone()).await?)
    }

    fn namespace(&self) -> String {
        self.inner.namespace().to_string()
    }
}
