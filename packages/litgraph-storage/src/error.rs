//! Error types for litgraph-storage.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for litgraph_core::GraphError {
    fn from(err: StorageError) -> Self {
        litgraph_core::GraphError::StoreUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_into_store_unavailable() {
        let err: StorageError = rusqlite::Error::QueryReturnedNoRows.into();
        let graph_err: litgraph_core::GraphError = err.into();
        assert!(matches!(
            graph_err,
            litgraph_core::GraphError::StoreUnavailable(_)
        ));
    }
}
