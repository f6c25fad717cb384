#![warn(clippy::unwrap_used)]

//! Product catalog access: the [`CatalogStore`] contract used by the
//! recommendation engine and its SQLite implementation.

pub mod sqlite;
pub mod store;

pub use sqlite::{NewProduct, SqliteCatalog};
pub use store::CatalogStore;
