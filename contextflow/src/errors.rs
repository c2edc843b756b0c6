//! Error types for the contextflow crate.
//!
//! A wrapped unit's own failure is never represented here: it travels back
//! through the delegate's normal return channel untouched. These types cover
//! the mechanism itself (capture, submission, handle completion).

use thiserror::Error;

/// The main error type for contextflow operations.
#[derive(Debug, Error)]
pub enum ContextflowError {
    /// The thread-confined holder storage is not accessible on this thread.
    ///
    /// This is fatal to the submission call itself and is raised before any
    /// work reaches the delegate.
    #[error("context holder storage is not accessible on this thread")]
    HolderUnavailable,

    /// The delegate refused the submission, typically after shutdown.
    #[error("task rejected by the delegate executor: {0}")]
    Rejected(String),

    /// A wait-for-any call observed no completed task.
    #[error("no submitted task completed")]
    NoTaskCompleted,
}

/// Failure outcome of a submitted task, as observed through its handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// The task panicked while running.
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The task was cancelled before producing a value.
    #[error("task cancelled: {0}")]
    Cancelled(String),

    /// The executor retired the task without running it to completion.
    #[error("task dropped before completion")]
    Dropped,
}
