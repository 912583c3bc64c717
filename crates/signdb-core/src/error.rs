use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Search service not initialized; build the index first")]
    NotInitialized,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Store(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Wrap a lower-level failure from an index or embedding provider.
    pub fn retrieval(err: impl std::fmt::Display) -> Self {
        Self::Retrieval(format!("{err:#}"))
    }

    /// Wrap a lower-level failure from the content store.
    pub fn store(err: impl std::fmt::Display) -> Self {
        Self::Store(format!("{err:#}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
