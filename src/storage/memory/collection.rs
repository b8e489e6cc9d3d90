use crate::errors::StorageError;
use crate::storage::{MovieCollection, checked_skip};
use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use parking_lot::RwLock;

use super::eval::eval_filter;
use super::filter::{Filter, parse_query};

/// An in-process collection. Documents keep insertion order, which is the
/// natural order `find_page` returns them in.
#[derive(Debug)]
pub struct MemoryCollection {
    namespace: String,
    docs: RwLock<Vec<Document>>,
    text_fields: RwLock<Vec<String>>,
}

impl MemoryCollection {
    #[must_use]
    pub fn new(namespace: String) -> Self {
        Self { namespace, docs: RwLock::new(Vec::new()), text_fields: RwLock::new(Vec::new()) }
    }

    /// Stores a document, assigning an `ObjectId` `_id` when it has none.
    pub fn insert_document(&self, mut doc: Document) -> Bson {
        if !doc.contains_key("_id") {
            doc.insert("_id", ObjectId::new());
        }
        let id = doc.get("_id").cloned().unwrap_or(Bson::Null);
        self.docs.write().push(doc);
        id
    }

    pub fn insert_many<I: IntoIterator<Item = Document>>(&self, docs: I) -> usize {
        docs.into_iter().map(|d| self.insert_document(d)).count()
    }

    /// Replaces the collection's text index. A collection holds at most one.
    pub fn create_text_index(&self, fields: &[&str]) {
        *self.text_fields.write() = fields.iter().map(|f| (*f).to_string()).collect();
        log::debug!("text index on {} over {:?}", self.namespace, fields);
    }

    #[must_use]
    pub fn text_index_fields(&self) -> Vec<String> {
        self.text_fields.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    fn plan(&self, query: &Document) -> Result<(Filter, Vec<String>), StorageError> {
        let filter = parse_query(query)?;
        let fields = self.text_index_fields();
        if filter.uses_text() && fields.is_empty() {
            return Err(StorageError::TextIndexRequired);
        }
        Ok((filter, fields))
    }

    /// # Errors
    /// Fails on a malformed query, a negative `skip`, or `$text` without a text index.
    pub fn find(&self, query: &Document, skip: i64, limit: i64) -> Result<Vec<Document>, StorageError> {
        let skip = usize::try_from(checked_skip(skip)?).unwrap_or(usize::MAX);
        let limit = match usize::try_from(limit.unsigned_abs()).unwrap_or(usize::MAX) {
            0 => usize::MAX,
            n => n,
        };
        let (filter, fields) = self.plan(query)?;
        let docs = self.docs.read();
        Ok(docs.iter().filter(|d| eval_filter(d, &filter, &fields)).skip(skip).take(limit).cloned().collect())
    }

    /// # Errors
    /// Fails on a malformed query or `$text` without a text index.
    pub fn count_documents(&self, query: &Document) -> Result<u64, StorageError> {
        let (filter, fields) = self.plan(query)?;
        let docs = self.docs.read();
        let n = docs.iter().filter(|d| eval_filter(d, &filter, &fields)).count();
        Ok(n as u64)
    }
}

#[async_trait]
impl MovieCollection for MemoryCollection {
    async fn find_page(&self, query: &Document, skip: i64, limit: i64) -> Result<Vec<Document>, StorageError> {
        self.find(query, skip, limit)
    }

    async fn count(&self, query: &Document) -> Result<u64, StorageError> {
        self.count_documents(query)
    }

    fn namespace(&self) -> String {
        self.namespace.clone()
    }
}
