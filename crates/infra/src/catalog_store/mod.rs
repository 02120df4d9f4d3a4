//! Catalog storage boundary.
//!
//! The batch core reads records and writes price mutations through
//! [`CatalogStore`]; the real storage/query engine lives behind it.

pub mod in_memory;
pub mod store;

pub use in_memory::InMemoryCatalogStore;
pub use store::{CatalogStore, StoreError};
