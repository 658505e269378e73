#![deny(missing_docs)]

//! A fixed-size worker thread pool.
//!
//! Tasks submitted to a [`WorkerPool`] are queued in FIFO order and run by
//! a bounded set of worker threads. Each submission returns a
//! [`TaskHandle`] that reports the task's value, its panic, or its
//! cancellation. Shutdown is explicit: [`ShutdownMode::Graceful`] runs
//! every queued task, [`ShutdownMode::Forced`] discards those not yet
//! started.

mod config;
mod error;
/// The worker pool, its task handles and lifecycle types.
pub mod thread_pool;

pub use config::{PoolConfig, DEFAULT_THREAD_NAME_PREFIX};
pub use error::{PoolError, Result};
pub use thread_pool::{PoolState, ShutdownMode, TaskHandle, WorkerPool};
