//! signdb-store
//!
//! Read-only access to the lesson catalogue: topics, lessons and units.
//! Everything the core needs goes through [`RecordSource`], which only knows
//! equality filters and ascending ordering over flat records.

pub mod memory;
pub mod query;
pub mod rest;
pub mod store;

pub use memory::MemorySource;
pub use query::TableQuery;
pub use rest::RestSource;
pub use store::{ContentStore, RecordSource};
