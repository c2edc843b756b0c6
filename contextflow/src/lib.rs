//! # Contextflow
//!
//! Ambient-context propagation across executors and worker threads.
//!
//! An ambient context (say, the identity bound to the thread that initiated
//! a unit of work) is confined to its thread by default: hand the work to a
//! pool and it runs with no context at all. Contextflow provides the
//! propagation mechanism:
//!
//! - **Thread-confined holder**: an injectable cell for the active context
//! - **Snapshots**: immutable captures taken at a well-defined instant
//! - **Task decorators**: install/run/restore around one unit of work, with
//!   restoration guaranteed on every exit path
//! - **Executor decorators**: drop-in wrappers for fire-and-forget,
//!   future-bearing, scheduled, and named-job executors
//! - **Selection policy**: a fixed context for every submission, or the
//!   submitting thread's live context captured per call
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use contextflow::prelude::*;
//! use std::sync::Arc;
//!
//! let holder: ContextHolder<UserContext> = ContextHolder::new();
//! holder.set(current_user())?;
//!
//! // Wrap any executor; submissions carry the submitter's context.
//! let executor = ContextExecutor::new(pool, holder.clone(), ContextPolicy::current());
//! executor.execute(Box::new(|| audit_log_write()))?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod context;
pub mod errors;
pub mod executor;
pub mod task;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::context::{ContextHolder, ContextPolicy, ContextScope, ContextSnapshot};
    pub use crate::errors::{ContextflowError, TaskError};
    pub use crate::executor::{
        task_channel, ContextExecutor, ContextExecutorService, ContextJobScheduler,
        ContextScheduledExecutor, Executor, ExecutorService, JobId, JobSchedule, ScheduledExecutor,
        ScheduledHandle, ScheduledJob, TaskHandle, TaskOutcome, TaskPromise,
    };
    pub use crate::task::{
        decorate_cancellable, decorate_procedure, decorate_value, CancelOutcome,
    };
    pub use crate::testing::{FixedThreadPool, TimerPool};
}
