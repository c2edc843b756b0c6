//! Decorator for the future-bearing executor service shape.

use super::{Executor, ExecutorService, TaskHandle, TaskOutcome};
use crate::context::{ContextHolder, ContextPolicy};
use crate::errors::ContextflowError;
use crate::task::{decorate_procedure, decorate_value};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

/// A future-bearing executor service that propagates context.
///
/// Exposes the delegate's full vocabulary plus batch submission. Every unit
/// in a batch is wrapped independently, evaluating the policy at its own
/// submission instant, so a batch spread over different worker threads still
/// behaves consistently per unit. Lifecycle operations pass straight
/// through; the decorator owns no threads.
pub struct ContextExecutorService<C, S> {
    delegate: Arc<S>,
    holder: ContextHolder<C>,
    policy: ContextPolicy<C>,
}

impl<C, S> ContextExecutorService<C, S>
where
    C: Clone + Send + Sync + 'static,
    S: ExecutorService,
{
    /// Creates a decorator around `delegate` using the given policy.
    #[must_use]
    pub fn new(delegate: Arc<S>, holder: ContextHolder<C>, policy: ContextPolicy<C>) -> Self {
        Self {
            delegate,
            holder,
            policy,
        }
    }

    /// Returns the wrapped delegate.
    #[must_use]
    pub fn delegate(&self) -> &Arc<S> {
        &self.delegate
    }

    /// Submits a batch, wrapping each unit at its own submission instant.
    ///
    /// # Errors
    ///
    /// Fails on the first capture failure or delegate rejection; units
    /// submitted before the failure keep running.
    pub fn submit_all<R: Send + 'static>(
        &self,
        tasks: Vec<Box<dyn FnOnce() -> R + Send>>,
    ) -> Result<Vec<TaskHandle<R>>, ContextflowError> {
        tasks.into_iter().map(|task| self.submit(task)).collect()
    }

    /// Submits a batch and waits for every unit to finish.
    ///
    /// # Errors
    ///
    /// Fails on the first capture failure or delegate rejection.
    pub fn invoke_all<R: Send + 'static>(
        &self,
        tasks: Vec<Box<dyn FnOnce() -> R + Send>>,
    ) -> Result<Vec<TaskOutcome<R>>, ContextflowError> {
        let handles = self.submit_all(tasks)?;
        Ok(handles.into_iter().map(TaskHandle::wait).collect())
    }

    /// Submits a batch and returns the first completed value.
    ///
    /// The remaining units run to completion and their results are dropped;
    /// the decorator never force-interrupts on their behalf.
    ///
    /// # Errors
    ///
    /// Returns [`ContextflowError::NoTaskCompleted`] for an empty batch or
    /// when every unit panicked before completing.
    pub fn invoke_any<R: Send + 'static>(
        &self,
        tasks: Vec<Box<dyn FnOnce() -> R + Send>>,
    ) -> Result<R, ContextflowError> {
        if tasks.is_empty() {
            return Err(ContextflowError::NoTaskCompleted);
        }

        let (completed, completions) = mpsc::channel();
        for task in tasks {
            let snapshot = self.policy.select(&self.holder)?;
            let wrapped = decorate_value(&self.holder, snapshot, task);
            let completed = completed.clone();
            self.delegate.execute(Box::new(move || {
                let _ = completed.send(wrapped());
            }))?;
        }
        drop(completed);

        completions
            .recv()
            .map_err(|_| ContextflowError::NoTaskCompleted)
    }
}

impl<C, S> Executor for ContextExecutorService<C, S>
where
    C: Clone + Send + Sync + 'static,
    S: ExecutorService,
{
    fn execute(&self, task: Box<dyn FnOnce() + Send>) -> Result<(), ContextflowError> {
        let snapshot = self.policy.select(&self.holder)?;
        self.delegate
            .execute(Box::new(decorate_procedure(&self.holder, snapshot, task)))
    }
}

impl<C, S> ExecutorService for ContextExecutorService<C, S>
where
    C: Clone + Send + Sync + 'static,
    S: ExecutorService,
{
    fn submit<R: Send + 'static>(
        &self,
        task: Box<dyn FnOnce() -> R + Send>,
    ) -> Result<TaskHandle<R>, ContextflowError> {
        let snapshot = self.policy.select(&self.holder)?;
        self.delegate
            .submit(Box::new(decorate_value(&self.holder, snapshot, task)))
    }

    fn shutdown(&self) {
        self.delegate.shutdown();
    }

    fn await_termination(&self, timeout: Duration) -> bool {
        self.delegate.await_termination(timeout)
    }
}

impl<C, S> std::fmt::Debug for ContextExecutorService<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextExecutorService")
            .field("holder", &self.holder)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TaskError;
    use crate::testing::FixedThreadPool;

    fn service(
        workers: usize,
        policy: ContextPolicy<u64>,
    ) -> (
        ContextExecutorService<u64, FixedThreadPool>,
        ContextHolder<u64>,
    ) {
        let holder = ContextHolder::new();
        let pool = Arc::new(FixedThreadPool::new(workers));
        (
            ContextExecutorService::new(pool, holder.clone(), policy),
            holder,
        )
    }

    #[test]
    fn test_submit_propagates_current_context() {
        let (service, holder) = service(2, ContextPolicy::current());
        holder.set(21).unwrap();

        let reading = holder.clone();
        let handle = service
            .submit(Box::new(move || reading.get().unwrap()))
            .unwrap();

        assert_eq!(handle.wait(), Ok(Some(21)));
        service.shutdown();
        assert!(service.await_termination(Duration::from_secs(5)));
    }

    #[test]
    fn test_batch_units_capture_their_own_instant() {
        let (service, holder) = service(1, ContextPolicy::current());

        // The policy runs at submission time on this thread, so mutating the
        // holder between submissions must be visible per unit.
        holder.set(1).unwrap();
        let reading = holder.clone();
        let first = service
            .submit(Box::new(move || reading.get().unwrap()))
            .unwrap();

        holder.set(2).unwrap();
        let reading = holder.clone();
        let second = service
            .submit(Box::new(move || reading.get().unwrap()))
            .unwrap();

        assert_eq!(first.wait(), Ok(Some(1)));
        assert_eq!(second.wait(), Ok(Some(2)));
    }

    #[test]
    fn test_invoke_all_waits_for_every_unit() {
        let (service, holder) = service(4, ContextPolicy::fixed(7));

        let tasks: Vec<Box<dyn FnOnce() -> Option<u64> + Send>> = (0..8)
            .map(|_| {
                let reading = holder.clone();
                Box::new(move || reading.get().unwrap()) as Box<dyn FnOnce() -> Option<u64> + Send>
            })
            .collect();

        let outcomes = service.invoke_all(tasks).unwrap();
        assert_eq!(outcomes.len(), 8);
        for outcome in outcomes {
            assert_eq!(outcome, Ok(Some(7)));
        }
    }

    #[test]
    fn test_invoke_any_returns_a_completion() {
        let (service, _holder) = service(2, ContextPolicy::cleared());

        let tasks: Vec<Box<dyn FnOnce() -> u64 + Send>> = vec![
            Box::new(|| {
                std::thread::sleep(Duration::from_millis(50));
                1
            }),
            Box::new(|| 2),
        ];

        let value = service.invoke_any(tasks).unwrap();
        assert!(value == 1 || value == 2);
    }

    #[test]
    fn test_invoke_any_empty_batch() {
        let (service, _holder) = service(1, ContextPolicy::cleared());
        let result = service.invoke_any(Vec::<Box<dyn FnOnce() -> u64 + Send>>::new());
        assert!(matches!(result, Err(ContextflowError::NoTaskCompleted)));
    }

    #[test]
    fn test_panicking_unit_fails_its_handle_and_restores() {
        let (service, holder) = service(1, ContextPolicy::fixed(5));

        let handle = service
            .submit(Box::new(|| -> u64 { panic!("unit blew up") }))
            .unwrap();
        assert!(matches!(handle.wait(), Err(TaskError::Panicked(_))));

        // Undecorated probe on the same single worker thread: the holder was
        // restored to empty, not left holding the panicked unit's context.
        let reading = holder.clone();
        let probe = service
            .delegate()
            .submit(Box::new(move || reading.get().unwrap()))
            .unwrap();
        assert_eq!(probe.wait(), Ok(None));
    }
}
