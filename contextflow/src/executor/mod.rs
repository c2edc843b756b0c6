//! Executor shapes and their context-propagating decorators.
//!
//! Each executor shape is a small capability trait; a decorator per shape
//! exposes the identical submission vocabulary as its delegate, so it is a
//! drop-in substitute wherever the undecorated type is expected. Decorators
//! own no threads and carry no per-submission state: every submission
//! selects its snapshot per the configured policy and forwards a wrapped
//! unit to the delegate.

mod execute;
mod handle;
mod scheduled;
mod scheduler;
mod service;

pub use execute::ContextExecutor;
pub use handle::{task_channel, TaskHandle, TaskOutcome, TaskPromise};
pub use scheduled::{ContextScheduledExecutor, ScheduledHandle};
pub use scheduler::{ContextJobScheduler, JobId, JobSchedule, ScheduledJob};
pub use service::ContextExecutorService;

use crate::errors::ContextflowError;
use std::time::Duration;

/// A fire-and-forget executor: accepts a procedure, provides no result
/// channel.
pub trait Executor: Send + Sync {
    /// Submits a procedure for execution on some worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`ContextflowError::Rejected`] if the executor refuses the
    /// submission, typically after shutdown.
    fn execute(&self, task: Box<dyn FnOnce() + Send>) -> Result<(), ContextflowError>;
}

/// A future-bearing executor: submissions come back as waitable handles,
/// and the executor can be drained and terminated.
pub trait ExecutorService: Executor {
    /// Submits a value computation, returning a handle for its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ContextflowError::Rejected`] if the executor refuses the
    /// submission.
    fn submit<R: Send + 'static>(
        &self,
        task: Box<dyn FnOnce() -> R + Send>,
    ) -> Result<TaskHandle<R>, ContextflowError>;

    /// Stops accepting new work. Already-queued work is still drained.
    fn shutdown(&self);

    /// Blocks until all workers have retired or the timeout elapses.
    /// Returns true if termination completed within the timeout.
    fn await_termination(&self, timeout: Duration) -> bool;
}

/// A delayed/periodic executor.
pub trait ScheduledExecutor: Send + Sync {
    /// Runs a procedure once after `delay`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextflowError::Rejected`] if the executor refuses the
    /// submission.
    fn schedule_once(
        &self,
        delay: Duration,
        task: Box<dyn FnOnce() + Send>,
    ) -> Result<ScheduledHandle, ContextflowError>;

    /// Runs a procedure repeatedly: first after `initial_delay`, then every
    /// `period`, until the returned handle is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`ContextflowError::Rejected`] if the executor refuses the
    /// submission.
    fn schedule_at_fixed_rate(
        &self,
        initial_delay: Duration,
        period: Duration,
        task: Box<dyn Fn() + Send>,
    ) -> Result<ScheduledHandle, ContextflowError>;
}
