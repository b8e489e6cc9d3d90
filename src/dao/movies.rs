use crate::errors::StorageError;
use crate::logger::METRICS_TARGET;
use std::sync::Arc;
use std::time::Instant;

use super::binding::MovieBinding;
use super::filter::MovieFilter;
use super::page::{PageRequest, PageResult};

/// Read access to the movies collection.
///
/// Cheap to clone; every clone reads the same [`MovieBinding`].
#[derive(Debug, Clone)]
pub struct MoviesDao {
    binding: Arc<MovieBinding>,
}

impl MoviesDao {
    #[must_use]
    pub const fn new(binding: Arc<MovieBinding>) -> Self {
        Self { binding }
    }

    #[must_use]
    pub fn binding(&self) -> &Arc<MovieBinding> {
        &self.binding
    }

    /// Fetches one page of movies matching `filter`.
    ///
    /// Never fails: any storage error, including an unbound collection, is
    /// logged and answered with [`PageResult::empty`].
    pub async fn get_movies(&self, filter: &MovieFilter, page: PageRequest) -> PageResult {
        match self.try_get_movies(filter, page).await {
            Ok(result) => result,
            Err(e) => {
                log::error!("Unable to issue find command, {e}");
                PageResult::empty()
            }
        }
    }

    /// Fallible core of [`get_movies`](Self::get_movies).
    ///
    /// # Errors
    /// Returns `StorageError::NotBound` before a successful bind, otherwise
    /// whatever the find or count step raised.
    pub async fn try_get_movies(&self, filter: &MovieFilter, page: PageRequest) -> Result<PageResult, StorageError> {
        let start = Instant::now();
        let skip = page.skip();
        let outcome = self.run(filter, skip, page.page_size).await;
        let elapsed_ms = start.elapsed().as_millis();
        match &outcome {
            Ok(r) => log::info!(
                target: METRICS_TARGET,
                "query filter={} skip={} limit={} returned={} total={} elapsed_ms={} outcome=ok",
                filter.kind(), skip, page.page_size, r.items.len(), r.total_matching, elapsed_ms
            ),
            Err(e) => log::warn!(
                target: METRICS_TARGET,
                "query filter={} skip={} limit={} elapsed_ms={} outcome=error error=\"{e}\"",
                filter.kind(), skip, page.page_size, elapsed_ms
            ),
        }
        outcome
    }

    async fn run(&self, filter: &MovieFilter, skip: i64, limit: i64) -> Result<PageResult, StorageError> {
        let movies = self.binding.handle().ok_or(StorageError::NotBound)?;
        let query = filter.to_query();
        log::debug!("find on {} query={query} skip={skip} limit={limit}", movies.namespace());
        let items = movies.find_page(&query, skip, limit).await?;
        let total_matching = movies.count(&query).await?;
        Ok(PageResult { items, total_matching })
    }
}
