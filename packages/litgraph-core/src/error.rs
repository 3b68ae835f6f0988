use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    /// Transient upstream query failure. Propagated to the caller; no local
    /// retry policy is assumed.
    #[error("knowledge store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A non-lazy walk was requested from a node with no incident hyperedges.
    #[error("walk started at isolated node {0}")]
    IsolatedStart(usize),

    /// Cooperative cancellation observed at a batch boundary. State flushed
    /// before this row stays valid for resumption.
    #[error("cancelled at row {0}")]
    Cancelled(usize),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bincode error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
}

impl GraphError {
    pub fn store<E: std::fmt::Display>(e: E) -> Self {
        Self::StoreUnavailable(e.to_string())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphError::IsolatedStart(42);
        assert!(format!("{}", err).contains("42"));

        let err = GraphError::invalid("nstep must be >= 1");
        assert!(format!("{}", err).contains("nstep"));
    }

    #[test]
    fn test_result_propagation() {
        fn inner() -> Result<()> {
            Err(GraphError::store("connection refused"))
        }

        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }

        assert!(matches!(outer(), Err(GraphError::StoreUnavailable(_))));
    }
}
