#![allow(dead_code)]

use async_trait::async_trait;
use bson::{Document, doc};
use moviereviews::dao::{MovieBinding, MoviesDao};
use moviereviews::errors::StorageError;
use moviereviews::storage::memory::MemoryCollection;
use moviereviews::storage::{MemoryEngine, MovieCollection, StorageConnection};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const NS: &str = "sample_mflix";
pub const RATINGS: [&str; 4] = ["G", "PG", "PG-13", "R"];

/// `n` movies titled "Movie {i}" with ratings cycling through [`RATINGS`].
pub fn fixture(n: usize) -> Vec<Document> {
    (0..n).map(|i| doc! { "title": format!("Movie {i}"), "rated": RATINGS[i % RATINGS.len()], "idx": i as i64 }).collect()
}

/// An engine whose `sample_mflix.movies` holds `docs` with a text index on `title`.
pub fn engine_with(docs: Vec<Document>) -> (Arc<MemoryEngine>, Arc<MemoryCollection>) {
    let engine = Arc::new(MemoryEngine::new());
    let movies = engine.collection_handle(NS, "movies").unwrap();
    movies.create_text_index(&["title"]);
    movies.insert_many(docs);
    (engine, movies)
}

pub fn bound_dao(conn: &dyn StorageConnection) -> MoviesDao {
    let binding = Arc::new(MovieBinding::new(Some(NS.to_string())));
    binding.bind(conn);
    assert!(binding.is_bound());
    MoviesDao::new(binding)
}

pub fn idx(doc: &Document) -> i64 {
    doc.get_i64("idx").unwrap()
}

/// Counts resolution calls before delegating to a wrapped connection.
pub struct SpyConnection<C> {
    pub inner: C,
    pub calls: AtomicUsize,
}

impl<C> SpyConnection<C> {
    pub fn new(inner: C) -> Self {
        Self { inner, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<C: StorageConnection> StorageConnection for SpyConnection<C> {
    fn collection(&self, database: &str, collection: &str) -> Result<Arc<dyn MovieCollection>, StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.collection(database, collection)
    }
}

/// A connection that can never resolve anything.
pub struct BrokenConnection;

impl StorageConnection for BrokenConnection {
    fn collection(&self, _database: &str, _collection: &str) -> Result<Arc<dyn MovieCollection>, StorageError> {
        Err(StorageError::QueryError("connection closed".into()))
    }
}

/// Hands out one fixed collection handle.
pub struct FixedConnection(pub Arc<dyn MovieCollection>);

impl StorageConnection for FixedConnection {
    fn collection(&self, _database: &str, _collection: &str) -> Result<Arc<dyn MovieCollection>, StorageError> {
        Ok(self.0.clone())
    }
}

/// Serves real data but fails the find and/or count step on demand.
pub struct FlakyCollection {
    pub inner: Arc<MemoryCollection>,
    pub fail_find: bool,
    pub fail_count: bool,
}

#[async_trait]
impl MovieCollection for FlakyCollection {
    async fn find_page(&self, query: &Document, skip: i64, limit: i64) -> Result<Vec<Document>, StorageError> {
        if self.fail_find {
            return Err(StorageError::QueryError("find: connection reset".into()));
        }
        self.inner.find(query, skip, limit)
    }

    async fn count(&self, query: &Document) -> Result<u64, StorageError> {
        if self.fail_count {
            return Err(StorageError::QueryError("count: connection reset".into()));
        }
        self.inner.count_documents(query)
    }

    fn namespace(&self) -> String {
        "flaky.movies".into()
    }
}
