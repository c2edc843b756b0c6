//! A thread-per-job timer used as a scheduled delegate in tests.

use crate::cancellation::CancellationToken;
use crate::errors::ContextflowError;
use crate::executor::{ScheduledExecutor, ScheduledHandle};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// A cancel-aware alarm: sleeps for a delay but wakes early when the job's
/// token is cancelled, so cancellation takes effect promptly instead of
/// after a full period.
struct Alarm {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Alarm {
    fn new(token: &CancellationToken) -> Self {
        let inner = Arc::new((Mutex::new(false), Condvar::new()));
        let notify = inner.clone();
        token.on_cancel(move || {
            *notify.0.lock() = true;
            notify.1.notify_all();
        });
        Self { inner }
    }

    /// Sleeps for `delay`. Returns true if cancellation fired first.
    fn wait(&self, delay: Duration) -> bool {
        let deadline = Instant::now() + delay;
        let mut fired = self.inner.0.lock();
        while !*fired {
            if self.inner.1.wait_until(&mut fired, deadline).timed_out() {
                return *fired;
            }
        }
        true
    }
}

/// A scheduled delegate spawning one thread per job.
///
/// Cancelling a handle before its first run means the task is never invoked;
/// cancelling a repeating job stops it after the current run.
#[derive(Default)]
pub struct TimerPool {
    jobs: Mutex<Vec<(ScheduledHandle, JoinHandle<()>)>>,
}

impl TimerPool {
    /// Creates an empty timer pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels every job and joins their threads.
    pub fn shutdown(&self) {
        let jobs = std::mem::take(&mut *self.jobs.lock());
        for (handle, thread) in jobs {
            handle.cancel("timer pool shut down");
            let _ = thread.join();
        }
    }

    /// Returns the number of jobs ever scheduled and not yet shut down.
    #[must_use]
    pub fn job_count(&self) -> usize {
        self.jobs.lock().len()
    }
}

impl ScheduledExecutor for TimerPool {
    fn schedule_once(
        &self,
        delay: Duration,
        task: Box<dyn FnOnce() + Send>,
    ) -> Result<ScheduledHandle, ContextflowError> {
        let token = Arc::new(CancellationToken::new());
        let handle = ScheduledHandle::new(token.clone());
        let alarm = Alarm::new(&token);

        let thread = std::thread::spawn(move || {
            if alarm.wait(delay) || token.is_cancelled() {
                return;
            }
            task();
        });

        self.jobs.lock().push((handle.clone(), thread));
        Ok(handle)
    }

    fn schedule_at_fixed_rate(
        &self,
        initial_delay: Duration,
        period: Duration,
        task: Box<dyn Fn() + Send>,
    ) -> Result<ScheduledHandle, ContextflowError> {
        let token = Arc::new(CancellationToken::new());
        let handle = ScheduledHandle::new(token.clone());
        let alarm = Alarm::new(&token);

        let thread = std::thread::spawn(move || {
            if alarm.wait(initial_delay) {
                return;
            }
            loop {
                if token.is_cancelled() {
                    return;
                }
                task();
                if alarm.wait(period) {
                    return;
                }
            }
        });

        self.jobs.lock().push((handle.clone(), thread));
        Ok(handle)
    }
}

impl Drop for TimerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for TimerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerPool")
            .field("job_count", &self.job_count())
            .finish()
    }
}
