use bson::Document;
use serde::{Deserialize, Serialize};

/// Default number of movies per page.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

pub type MovieRecord = Document;

/// Zero-indexed page selection. Values are passed through to storage
/// unchecked; a negative skip is rejected there and surfaces as an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, page_size: DEFAULT_PAGE_SIZE }
    }
}

impl PageRequest {
    #[must_use]
    pub const fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// Records to skip before the page starts.
    #[must_use]
    pub const fn skip(&self) -> i64 {
        self.page.saturating_mul(self.page_size)
    }
}

/// One page of movies plus the count of every match, independent of paging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub items: Vec<MovieRecord>,
    pub total_matching: u64,
}

impl PageResult {
    /// The uniform failure representation.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}
