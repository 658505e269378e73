/// Lifecycle state of a [`WorkerPool`].
///
/// Transitions are monotonic: `Running → ShuttingDown → Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// Accepting and executing tasks.
    Running,
    /// No longer accepting tasks. Workers are finishing, and under a
    /// forced shutdown discarding, the remaining work.
    ShuttingDown,
    /// Every worker has exited.
    Terminated,
}

/// How [`WorkerPool::shutdown`] treats tasks that are queued but not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Run every queued task before terminating.
    Graceful,
    /// Discard queued tasks. Their handles resolve with
    /// [`PoolError::Cancelled`](crate::PoolError::Cancelled).
    Forced,
}

/// A unit of work as it travels through the queue.
type Job = Box<dyn FnOnce() + Send + 'static>;

mod handle;
mod shared_queue;
mod worker;

pub use self::handle::TaskHandle;
pub use self::shared_queue::WorkerPool;
