use thiserror::Error;

/// Errors from acquiring a pooled connection.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PoolError {
    /// Dialing a fresh connection failed.
    #[error("dial failed: {0}")]
    Dial(#[from] std::io::Error),

    /// `Get` did not complete before the caller's deadline.
    #[error("connection acquisition timed out")]
    Timeout,
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, PoolError>;
