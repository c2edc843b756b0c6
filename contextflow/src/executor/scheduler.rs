//! Decorator for the named/recurring job scheduler shape.

use super::{ContextScheduledExecutor, ScheduledExecutor, ScheduledHandle};
use crate::context::{ContextHolder, ContextPolicy};
use crate::errors::ContextflowError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// When and how often a named job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSchedule {
    /// Run once after the delay.
    Once {
        /// Delay before the single run.
        delay: Duration,
    },
    /// Run repeatedly at a fixed rate.
    FixedRate {
        /// Delay before the first run.
        initial_delay: Duration,
        /// Interval between runs.
        period: Duration,
    },
}

/// Unique identifier of a scheduled job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A named job registered with a [`ContextJobScheduler`].
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    id: JobId,
    name: String,
    handle: ScheduledHandle,
}

impl ScheduledJob {
    /// Returns the job's unique id.
    #[must_use]
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Returns the job's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the cancellable handle for this job.
    #[must_use]
    pub fn handle(&self) -> &ScheduledHandle {
        &self.handle
    }

    /// Requests cancellation of this job.
    pub fn cancel(&self, reason: impl Into<String>) {
        self.handle.cancel(reason);
    }
}

/// A named-job scheduler that propagates context.
///
/// Same semantics as the scheduled executor shape, exposed through a
/// job-name vocabulary and implemented by delegating to a
/// [`ContextScheduledExecutor`]. Re-scheduling an existing name cancels and
/// replaces the prior job.
pub struct ContextJobScheduler<C, S> {
    scheduled: ContextScheduledExecutor<C, S>,
    jobs: RwLock<HashMap<String, ScheduledJob>>,
}

impl<C, S> ContextJobScheduler<C, S>
where
    C: Clone + Send + Sync + 'static,
    S: ScheduledExecutor,
{
    /// Creates a scheduler around `delegate` using the given policy.
    #[must_use]
    pub fn new(delegate: Arc<S>, holder: ContextHolder<C>, policy: ContextPolicy<C>) -> Self {
        Self {
            scheduled: ContextScheduledExecutor::new(delegate, holder, policy),
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Schedules a named job.
    ///
    /// The context snapshot is selected here, at the scheduling call, and
    /// every execution of the job runs under it.
    ///
    /// # Errors
    ///
    /// Returns [`ContextflowError::HolderUnavailable`] on capture failure or
    /// [`ContextflowError::Rejected`] if the delegate refuses the job.
    pub fn schedule_job(
        &self,
        name: impl Into<String>,
        schedule: JobSchedule,
        job: Box<dyn Fn() + Send>,
    ) -> Result<ScheduledJob, ContextflowError> {
        let name = name.into();
        let handle = match schedule {
            JobSchedule::Once { delay } => self
                .scheduled
                .schedule_once(delay, Box::new(move || job()))?,
            JobSchedule::FixedRate {
                initial_delay,
                period,
            } => self
                .scheduled
                .schedule_at_fixed_rate(initial_delay, period, job)?,
        };

        let entry = ScheduledJob {
            id: JobId::new(),
            name: name.clone(),
            handle,
        };
        if let Some(previous) = self.jobs.write().insert(name, entry.clone()) {
            previous.cancel("replaced by a newer schedule for the same job name");
        }
        Ok(entry)
    }

    /// Cancels a job by name. Returns true if the name was registered.
    pub fn cancel_job(&self, name: &str, reason: impl Into<String>) -> bool {
        match self.jobs.write().remove(name) {
            Some(job) => {
                job.cancel(reason);
                true
            }
            None => false,
        }
    }

    /// Returns the job registered under `name`, if any.
    #[must_use]
    pub fn job(&self, name: &str) -> Option<ScheduledJob> {
        self.jobs.read().get(name).cloned()
    }

    /// Returns the number of registered jobs.
    #[must_use]
    pub fn job_count(&self) -> usize {
        self.jobs.read().len()
    }
}

impl<C, S> std::fmt::Debug for ContextJobScheduler<C, S>
where
    C: Clone + Send + Sync + 'static,
    S: ScheduledExecutor,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextJobScheduler")
            .field("job_count", &self.job_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TimerPool;
    use parking_lot::Mutex;

    #[test]
    fn test_named_job_runs_with_scheduling_context() {
        let timer = Arc::new(TimerPool::new());
        let holder = ContextHolder::new();
        holder.set("nightly".to_string()).unwrap();

        let scheduler =
            ContextJobScheduler::new(timer.clone(), holder.clone(), ContextPolicy::current());

        let observed = Arc::new(Mutex::new(None));
        let sink = observed.clone();
        let reading = holder.clone();
        let job = scheduler
            .schedule_job(
                "report",
                JobSchedule::Once {
                    delay: Duration::from_millis(10),
                },
                Box::new(move || {
                    *sink.lock() = reading.get().unwrap();
                }),
            )
            .unwrap();

        assert_eq!(job.name(), "report");
        assert_eq!(scheduler.job_count(), 1);

        std::thread::sleep(Duration::from_millis(80));
        timer.shutdown();
        assert_eq!(*observed.lock(), Some("nightly".to_string()));
    }

    #[test]
    fn test_rescheduling_replaces_and_cancels_the_old_job() {
        let timer = Arc::new(TimerPool::new());
        let holder: ContextHolder<u64> = ContextHolder::new();
        let scheduler = ContextJobScheduler::new(timer.clone(), holder, ContextPolicy::cleared());

        let first = scheduler
            .schedule_job(
                "sync",
                JobSchedule::FixedRate {
                    initial_delay: Duration::from_millis(5),
                    period: Duration::from_millis(5),
                },
                Box::new(|| {}),
            )
            .unwrap();
        let second = scheduler
            .schedule_job(
                "sync",
                JobSchedule::FixedRate {
                    initial_delay: Duration::from_millis(5),
                    period: Duration::from_millis(5),
                },
                Box::new(|| {}),
            )
            .unwrap();

        assert!(first.handle().is_cancelled());
        assert!(!second.handle().is_cancelled());
        assert_eq!(scheduler.job_count(), 1);
        assert_ne!(first.id(), second.id());

        timer.shutdown();
    }

    #[test]
    fn test_cancel_job_by_name() {
        let timer = Arc::new(TimerPool::new());
        let holder: ContextHolder<u64> = ContextHolder::new();
        let scheduler = ContextJobScheduler::new(timer.clone(), holder, ContextPolicy::cleared());

        scheduler
            .schedule_job(
                "heartbeat",
                JobSchedule::FixedRate {
                    initial_delay: Duration::from_millis(5),
                    period: Duration::from_millis(5),
                },
                Box::new(|| {}),
            )
            .unwrap();

        assert!(scheduler.cancel_job("heartbeat", "test over"));
        assert!(!scheduler.cancel_job("heartbeat", "already gone"));
        assert_eq!(scheduler.job_count(), 0);

        timer.shutdown();
    }
}
