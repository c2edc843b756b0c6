//! Waitable completion handles for submitted tasks.

use crate::errors::TaskError;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;

/// The outcome observed through a [`TaskHandle`].
///
/// A unit's own domain failure is not a [`TaskError`]; fallible units return
/// a `Result` as their value `R` and it arrives here untouched.
pub type TaskOutcome<R> = Result<R, TaskError>;

struct Shared<R> {
    slot: Mutex<Option<TaskOutcome<R>>>,
    done: Condvar,
}

/// The consuming side of a one-shot completion channel.
pub struct TaskHandle<R> {
    shared: Arc<Shared<R>>,
}

/// The producing side of a one-shot completion channel.
///
/// Dropping an unfulfilled promise completes the handle with
/// [`TaskError::Dropped`], so a delegate that loses a task can never leave a
/// waiter blocked forever.
pub struct TaskPromise<R> {
    shared: Arc<Shared<R>>,
    fulfilled: bool,
}

/// Creates a linked promise/handle pair.
#[must_use]
pub fn task_channel<R>() -> (TaskPromise<R>, TaskHandle<R>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(None),
        done: Condvar::new(),
    });
    (
        TaskPromise {
            shared: shared.clone(),
            fulfilled: false,
        },
        TaskHandle { shared },
    )
}

impl<R> TaskHandle<R> {
    /// Returns true once an outcome is available.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.shared.slot.lock().is_some()
    }

    /// Blocks until the outcome is available and returns it.
    pub fn wait(self) -> TaskOutcome<R> {
        let mut slot = self.shared.slot.lock();
        while slot.is_none() {
            self.shared.done.wait(&mut slot);
        }
        match slot.take() {
            Some(outcome) => outcome,
            None => Err(TaskError::Dropped),
        }
    }

    /// Blocks until the outcome is available or the timeout elapses.
    /// Returns true if the task completed within the timeout.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let mut slot = self.shared.slot.lock();
        if slot.is_some() {
            return true;
        }
        let _ = self.shared.done.wait_for(&mut slot, timeout);
        slot.is_some()
    }
}

impl<R> TaskPromise<R> {
    /// Completes the handle with a value.
    pub fn complete(mut self, value: R) {
        self.fulfill(Ok(value));
    }

    /// Completes the handle with a failure.
    pub fn fail(mut self, error: TaskError) {
        self.fulfill(Err(error));
    }

    fn fulfill(&mut self, outcome: TaskOutcome<R>) {
        let mut slot = self.shared.slot.lock();
        if slot.is_none() {
            *slot = Some(outcome);
            self.shared.done.notify_all();
        }
        self.fulfilled = true;
    }
}

impl<R> Drop for TaskPromise<R> {
    fn drop(&mut self) {
        if !self.fulfilled {
            self.fulfill(Err(TaskError::Dropped));
        }
    }
}

impl<R> std::fmt::Debug for TaskHandle<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("done", &self.is_done())
            .finish()
    }
}

impl<R> std::fmt::Debug for TaskPromise<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPromise")
            .field("fulfilled", &self.fulfilled)
            .finish()
    }
}
