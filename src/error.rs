use std::io;
use thiserror::Error;

/// Error type for thread pool operations.
#[derive(Error, Debug)]
pub enum PoolError {
    /// The pool was default-constructed and holds no workers or queue.
    #[error("Thread pool is not initialized")]
    InvalidState,

    /// The pool has begun shutting down and no longer accepts tasks.
    #[error("Thread pool is shut down")]
    ShutDown,

    /// The OS refused to spawn a worker thread.
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
}

/// Result type alias for thread pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
