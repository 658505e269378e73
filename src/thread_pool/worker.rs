use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use log::{debug, error, warn};

use super::handle::panic_message;
use super::shared_queue::Shared;
use crate::PoolConfig;

/// Spawns worker `id`, named after the configured prefix.
pub(super) fn spawn_worker(id: usize, shared: Arc<Shared>, config: &PoolConfig) -> io::Result<()> {
    let mut builder =
        thread::Builder::new().name(format!("{}-{id}", config.thread_name_prefix()));
    if let Some(size) = config.stack_size() {
        builder = builder.stack_size(size);
    }
    builder.spawn(move || run(id, shared))?;
    Ok(())
}

/// Reports the worker's exit to the pool, even if the loop unwinds.
struct ExitGuard(Arc<Shared>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.0.worker_exited();
    }
}

fn run(id: usize, shared: Arc<Shared>) {
    let guard = ExitGuard(shared);
    let shared = &guard.0;
    debug!("Worker {id} started");

    while let Some(job) = shared.next_job() {
        if shared.is_forced() {
            warn!("Worker {id} discarded a task delivered after forced shutdown");
            drop(job);
            continue;
        }

        debug!("Worker {id} executing task");
        shared.task_started();
        // Only `execute` jobs can panic here; `submit` jobs report to their handle.
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
            error!(
                "Worker {id} task panicked, continuing: {}",
                panic_message(payload.as_ref())
            );
        }
        shared.task_finished();
    }

    debug!("Worker {id}: queue closed, shutting down");
}
