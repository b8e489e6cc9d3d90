//! Movies data-access object: the collection binder and the query service.

mod binding;
mod filter;
mod movies;
mod page;

pub use binding::{MOVIES_COLLECTION, MovieBinding};
pub use filter::{FilterSpec, MovieFilter};
pub use movies::MoviesDao;
pub use page::{DEFAULT_PAGE_SIZE, MovieRecord, PageRequest, PageResult};
