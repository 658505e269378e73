use std::io;
use thiserror::Error;

/// Error type for worker pool operations.
#[derive(Error, Debug)]
pub enum PoolError {
    /// A pool was requested with no worker threads.
    #[error("Invalid worker count: {0}, must be at least 1")]
    InvalidWorkerCount(usize),

    /// The OS refused to spawn a worker thread.
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),

    /// The pool has begun shutting down and accepts no new tasks.
    #[error("Pool is closed")]
    PoolClosed,

    /// The bounded task queue has no free slot.
    #[error("Task queue is full")]
    QueueFull,

    /// The task panicked. Carries the panic message.
    #[error("Task failed: {0}")]
    TaskFailure(String),

    /// The task was discarded by a forced shutdown before it started.
    #[error("Task cancelled")]
    Cancelled,
}

/// Result type alias for worker pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
