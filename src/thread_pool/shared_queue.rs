use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use log::{debug, error, info, warn};

use super::handle::{self, TaskHandle};
use super::{worker, Job, PoolState, ShutdownMode};
use crate::{PoolConfig, PoolError, Result};

/// A fixed-size pool of worker threads sharing one FIFO task queue.
///
/// Workers pull tasks from a single MPMC channel. A panicking task is
/// isolated: its failure is reported through its [`TaskHandle`] and the
/// worker carries on with the next task.
///
/// Dropping the pool starts a [`ShutdownMode::Graceful`] shutdown without
/// waiting for it; queued tasks still run.
///
/// ```
/// use std::time::Duration;
/// use workpool::{ShutdownMode, WorkerPool};
///
/// # fn main() -> workpool::Result<()> {
/// let pool = WorkerPool::new(4)?;
/// let handle = pool.submit(|| "Running in parallel")?;
/// pool.shutdown(ShutdownMode::Graceful);
/// assert!(pool.await_termination(Duration::from_secs(5)));
/// assert_eq!(handle.join()?, "Running in parallel");
/// # Ok(())
/// # }
/// ```
pub struct WorkerPool {
    shared: Arc<Shared>,
    threads: usize,
}

/// State shared between the pool and its workers.
pub(super) struct Shared {
    lifecycle: Mutex<Lifecycle>,
    terminated: Condvar,
    queue: Receiver<Job>,
    forced: AtomicBool,
    active: AtomicUsize,
    completed: AtomicU64,
}

struct Lifecycle {
    state: PoolState,
    /// Present exactly while the pool is `Running`.
    sender: Option<Sender<Job>>,
    live_workers: usize,
}

impl WorkerPool {
    /// Creates a pool of `threads` workers with an unbounded queue.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidWorkerCount`] if `threads` is zero,
    /// [`PoolError::Spawn`] if a worker thread cannot be started.
    pub fn new(threads: usize) -> Result<Self> {
        Self::with_config(PoolConfig::new(threads))
    }

    /// Creates a pool from a [`PoolConfig`].
    ///
    /// If a worker fails to spawn, the workers already started are shut
    /// down gracefully and the error is returned.
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        let threads = config.threads();
        if threads == 0 {
            return Err(PoolError::InvalidWorkerCount(threads));
        }

        let (sender, queue) = match config.queue_capacity() {
            Some(capacity) => channel::bounded(capacity),
            None => channel::unbounded(),
        };
        let shared = Arc::new(Shared {
            lifecycle: Mutex::new(Lifecycle {
                state: PoolState::Running,
                sender: Some(sender),
                live_workers: 0,
            }),
            terminated: Condvar::new(),
            queue,
            forced: AtomicBool::new(false),
            active: AtomicUsize::new(0),
            completed: AtomicU64::new(0),
        });

        for id in 0..threads {
            shared.lifecycle().live_workers += 1;
            if let Err(e) = worker::spawn_worker(id, Arc::clone(&shared), &config) {
                error!("Failed to spawn worker {id}: {e}");
                shared.lifecycle().live_workers -= 1;
                shared.begin_shutdown(ShutdownMode::Graceful);
                return Err(e.into());
            }
        }

        info!(
            "Started pool with {threads} workers ({})",
            match config.queue_capacity() {
                Some(capacity) => format!("queue capacity {capacity}"),
                None => "unbounded queue".to_owned(),
            }
        );
        Ok(WorkerPool { shared, threads })
    }

    /// Submits a task and returns a handle to its outcome.
    ///
    /// Blocks while a bounded queue is full, never on task execution.
    ///
    /// # Errors
    ///
    /// [`PoolError::PoolClosed`] once shutdown has begun.
    pub fn submit<F, T>(&self, task: F) -> Result<TaskHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (job, handle) = handle::package(task);
        self.enqueue(job)?;
        Ok(handle)
    }

    /// Submits a task without waiting for queue space.
    ///
    /// # Errors
    ///
    /// [`PoolError::QueueFull`] if a bounded queue has no free slot,
    /// [`PoolError::PoolClosed`] once shutdown has begun.
    pub fn try_submit<F, T>(&self, task: F) -> Result<TaskHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (job, handle) = handle::package(task);
        match self.sender()?.try_send(job) {
            Ok(()) => Ok(handle),
            Err(TrySendError::Full(_)) => Err(PoolError::QueueFull),
            Err(TrySendError::Disconnected(_)) => Err(PoolError::PoolClosed),
        }
    }

    /// Runs a task without a handle. A panic is logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// [`PoolError::PoolClosed`] once shutdown has begun.
    pub fn execute<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.enqueue(Box::new(task))
    }

    /// Stops accepting tasks and begins shutting down.
    ///
    /// Does not wait; see [`await_termination`](Self::await_termination).
    /// Calling it again, in either mode, has no effect.
    pub fn shutdown(&self, mode: ShutdownMode) {
        if !self.shared.begin_shutdown(mode) {
            return;
        }
        info!("Shutting down pool ({mode:?})");

        if mode == ShutdownMode::Forced {
            // Dropping a job resolves its handle as cancelled.
            let drained = self.shared.queue.try_iter().count();
            if drained > 0 {
                warn!("Drained {drained} queued tasks");
            }
        }
    }

    /// Blocks until the pool is terminated or `timeout` elapses.
    ///
    /// Returns whether the pool is terminated.
    pub fn await_termination(&self, timeout: Duration) -> bool {
        let lifecycle = self.shared.lifecycle();
        let (lifecycle, _) = self
            .shared
            .terminated
            .wait_timeout_while(lifecycle, timeout, |l| l.state != PoolState::Terminated)
            .unwrap_or_else(PoisonError::into_inner);
        lifecycle.state == PoolState::Terminated
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PoolState {
        self.shared.lifecycle().state
    }

    /// Number of worker threads the pool was created with.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Number of tasks waiting in the queue.
    pub fn queued_tasks(&self) -> usize {
        self.shared.queue.len()
    }

    /// Number of tasks currently executing.
    pub fn active_tasks(&self) -> usize {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Number of tasks that have run, including those that panicked.
    pub fn completed_tasks(&self) -> u64 {
        self.shared.completed.load(Ordering::SeqCst)
    }

    fn enqueue(&self, job: Job) -> Result<()> {
        self.sender()?
            .send(job)
            .map_err(|_| PoolError::PoolClosed)
    }

    /// Clones the sending half so a full bounded queue never blocks the
    /// lifecycle lock.
    fn sender(&self) -> Result<Sender<Job>> {
        self.shared
            .lifecycle()
            .sender
            .clone()
            .ok_or(PoolError::PoolClosed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown(ShutdownMode::Graceful);
    }
}

impl Shared {
    /// No task code runs under this lock, so a poisoned lock is still consistent.
    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves a running pool to `ShuttingDown`. Returns `false` if shutdown
    /// had already begun.
    fn begin_shutdown(&self, mode: ShutdownMode) -> bool {
        let mut lifecycle = self.lifecycle();
        if lifecycle.state != PoolState::Running {
            return false;
        }
        lifecycle.state = PoolState::ShuttingDown;
        if mode == ShutdownMode::Forced {
            self.forced.store(true, Ordering::SeqCst);
        }
        // Once the last sender is gone, workers exit as soon as the queue is empty.
        lifecycle.sender = None;
        if lifecycle.live_workers == 0 {
            self.terminate(&mut lifecycle);
        }
        true
    }

    fn terminate(&self, lifecycle: &mut Lifecycle) {
        lifecycle.state = PoolState::Terminated;
        self.terminated.notify_all();
        debug!("Pool terminated");
    }

    /// Blocks for the next job. `None` once the queue is closed and drained.
    pub(super) fn next_job(&self) -> Option<Job> {
        self.queue.recv().ok()
    }

    pub(super) fn is_forced(&self) -> bool {
        self.forced.load(Ordering::SeqCst)
    }

    pub(super) fn task_started(&self) {
        self.active.fetch_add(1, Ordering::SeqCst);
    }

    pub(super) fn task_finished(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    pub(super) fn worker_exited(&self) {
        let mut lifecycle = self.lifecycle();
        lifecycle.live_workers = lifecycle.live_workers.saturating_sub(1);
        if lifecycle.live_workers == 0 && lifecycle.state == PoolState::ShuttingDown {
            self.terminate(&mut lifecycle);
        }
    }
}
