//! Embedded, in-process document engine.
//!
//! Understands the subset of the MongoDB query language the movies DAO emits
//! (plus the common comparison and logical operators), so the service can run
//! and be tested without a database server.

mod collection;
mod engine;
mod eval;
mod filter;
pub mod seed;
mod text;

pub use collection::MemoryCollection;
pub use engine::MemoryEngine;
pub use eval::eval_filter;
pub use filter::{CmpOp, Filter, parse_query};
pub use seed::{SeedFormat, seed_from_path};
pub use text::{TextSearch, tokenize};
