//! A small fixed-size thread pool used as a delegate in tests.

use crate::errors::{ContextflowError, TaskError};
use crate::executor::{task_channel, Executor, ExecutorService, TaskHandle};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::warn;

type Job = Box<dyn FnOnce() + Send>;

struct PoolState {
    queue: VecDeque<Job>,
    shutdown: bool,
    live_workers: usize,
}

struct PoolInner {
    state: Mutex<PoolState>,
    work: Condvar,
    retired: Condvar,
}

/// A fixed-size worker pool implementing [`Executor`] and
/// [`ExecutorService`].
///
/// Shutdown is graceful: new submissions are rejected while already-queued
/// work drains. A panicking unit fails its own handle without killing the
/// worker thread, which keeps thread-reuse scenarios observable in tests.
pub struct FixedThreadPool {
    inner: Arc<PoolInner>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl FixedThreadPool {
    /// Creates a pool with `workers` worker threads.
    #[must_use]
    pub fn new(workers: usize) -> Self {
        let inner = Arc::new(PoolInner {
            state: Mutex::new(PoolState {
                queue: VecDeque::new(),
                shutdown: false,
                live_workers: workers,
            }),
            work: Condvar::new(),
            retired: Condvar::new(),
        });

        let handles = (0..workers)
            .map(|_| {
                let inner = inner.clone();
                std::thread::spawn(move || Self::worker_loop(&inner))
            })
            .collect();

        Self {
            inner,
            workers: Mutex::new(handles),
        }
    }

    fn worker_loop(inner: &PoolInner) {
        loop {
            let job = {
                let mut state = inner.state.lock();
                loop {
                    if let Some(job) = state.queue.pop_front() {
                        break Some(job);
                    }
                    if state.shutdown {
                        break None;
                    }
                    inner.work.wait(&mut state);
                }
            };
            match job {
                Some(job) => {
                    if catch_unwind(AssertUnwindSafe(job)).is_err() {
                        warn!("a pool job panicked; the worker keeps running");
                    }
                }
                None => break,
            }
        }

        let mut state = inner.state.lock();
        state.live_workers -= 1;
        inner.retired.notify_all();
    }
}

impl Executor for FixedThreadPool {
    fn execute(&self, task: Box<dyn FnOnce() + Send>) -> Result<(), ContextflowError> {
        let mut state = self.inner.state.lock();
        if state.shutdown {
            return Err(ContextflowError::Rejected("pool is shut down".to_string()));
        }
        state.queue.push_back(task);
        drop(state);
        self.inner.work.notify_one();
        Ok(())
    }
}

impl ExecutorService for FixedThreadPool {
    fn submit<R: Send + 'static>(
        &self,
        task: Box<dyn FnOnce() -> R + Send>,
    ) -> Result<TaskHandle<R>, ContextflowError> {
        let (promise, handle) = task_channel();
        self.execute(Box::new(move || {
            match catch_unwind(AssertUnwindSafe(task)) {
                Ok(value) => promise.complete(value),
                Err(panic) => promise.fail(TaskError::Panicked(panic_message(&panic))),
            }
        }))?;
        Ok(handle)
    }

    fn shutdown(&self) {
        self.inner.state.lock().shutdown = true;
        self.inner.work.notify_all();
    }

    fn await_termination(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.inner.state.lock();
        while state.live_workers > 0 {
            if self
                .inner
                .retired
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return state.live_workers == 0;
            }
        }
        true
    }
}

impl Drop for FixedThreadPool {
    fn drop(&mut self) {
        self.shutdown();
        let handles = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            let _ = handle.join();
        }
    }
}

impl std::fmt::Debug for FixedThreadPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("FixedThreadPool")
            .field("queued", &state.queue.len())
            .field("live_workers", &state.live_workers)
            .field("shutdown", &state.shutdown)
            .finish()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
