use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use log::debug;

use super::Job;
use crate::{PoolError, Result};

/// The outcome of a task as sent back by the worker that ran it.
type Outcome<T> = std::result::Result<T, String>;

/// A handle to the outcome of a submitted task.
///
/// The task runs whether or not its handle is kept. If a forced shutdown
/// discards the task before it starts, the handle resolves with
/// [`PoolError::Cancelled`].
#[derive(Debug)]
pub struct TaskHandle<T> {
    rx: Receiver<Outcome<T>>,
    resolved: Option<Result<T>>,
}

impl<T> TaskHandle<T> {
    /// Blocks until the task has finished or been discarded.
    ///
    /// # Errors
    ///
    /// [`PoolError::TaskFailure`] if the task panicked,
    /// [`PoolError::Cancelled`] if it never ran.
    pub fn join(self) -> Result<T> {
        match self.resolved {
            Some(result) => result,
            None => resolve(self.rx.recv().ok()),
        }
    }

    /// Waits up to `timeout` for the task to resolve.
    ///
    /// Returns `true` once the outcome is known. The outcome is kept, so a
    /// following [`join`](Self::join) returns without blocking.
    pub fn wait_timeout(&mut self, timeout: Duration) -> bool {
        if self.resolved.is_some() {
            return true;
        }
        let outcome = match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) => return false,
            Err(RecvTimeoutError::Disconnected) => None,
        };
        self.resolved = Some(resolve(outcome));
        true
    }
}

/// A missing outcome means the job was dropped without running.
fn resolve<T>(outcome: Option<Outcome<T>>) -> Result<T> {
    match outcome {
        Some(Ok(value)) => Ok(value),
        Some(Err(message)) => Err(PoolError::TaskFailure(message)),
        None => Err(PoolError::Cancelled),
    }
}

/// Wraps `task` into a queue job that reports to the returned handle.
pub(super) fn package<F, T>(task: F) -> (Job, TaskHandle<T>)
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = channel::bounded(1);
    let job = Box::new(move || {
        let outcome = panic::catch_unwind(AssertUnwindSafe(task)).map_err(|payload| {
            let message = panic_message(payload.as_ref());
            debug!("Task panicked: {message}");
            message
        });
        // The submitter may have dropped its handle.
        let _ = tx.send(outcome);
    });
    (
        job,
        TaskHandle {
            rx,
            resolved: None,
        },
    )
}

/// Extracts the message from a panic payload.
pub(super) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_job_resolves_to_value() {
        let (job, handle) = package(|| 6 * 7);
        job();
        assert_eq!(handle.join().unwrap(), 42);
    }

    #[test]
    fn panicking_job_resolves_to_failure() {
        let (job, handle) = package(|| {
            panic_control::disable_hook_in_current_thread();
            panic!("boom");
        });
        job();
        match handle.join() {
            Err(PoolError::TaskFailure(message)) => assert_eq!(message, "boom"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn formatted_panic_message_is_kept() {
        let (job, handle) = package(|| {
            panic_control::disable_hook_in_current_thread();
            let n = 3;
            panic!("bad input {n}");
        });
        job();
        match handle.join() {
            Err(PoolError::TaskFailure(message)) => assert_eq!(message, "bad input 3"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn dropped_job_resolves_to_cancelled() {
        let (job, handle) = package(|| ());
        drop(job);
        assert!(matches!(handle.join(), Err(PoolError::Cancelled)));
    }

    #[test]
    fn wait_timeout_caches_outcome() {
        let (job, mut handle) = package(|| "done");
        assert!(!handle.wait_timeout(Duration::from_millis(10)));
        job();
        assert!(handle.wait_timeout(Duration::from_millis(10)));
        assert!(handle.wait_timeout(Duration::ZERO));
        assert_eq!(handle.join().unwrap(), "done");
    }

    #[test]
    fn non_string_payload() {
        assert_eq!(panic_message(&17_u32), "non-string panic payload");
    }
}
