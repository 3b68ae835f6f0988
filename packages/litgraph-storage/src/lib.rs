//! litgraph-storage — SQLite adapter for the `KnowledgeStore` port.
//!
//! Keeps the relational backend out of the engine crate: litgraph-core
//! consumes the `KnowledgeStore` trait, this crate implements it over
//! `rusqlite`. All queries are read-only; schema creation exists only for
//! fixtures and tests.

pub mod error;
pub mod infrastructure;

pub use error::{Result, StorageError};
pub use infrastructure::sqlite::SqliteKnowledgeStore;
