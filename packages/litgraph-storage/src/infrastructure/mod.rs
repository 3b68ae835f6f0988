//! Backend adapters implementing the `KnowledgeStore` port.

pub mod sqlite;
