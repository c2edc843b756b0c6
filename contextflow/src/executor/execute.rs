//! Decorator for the fire-and-forget executor shape.

use super::Executor;
use crate::context::{ContextHolder, ContextPolicy};
use crate::errors::ContextflowError;
use crate::task::decorate_procedure;
use std::sync::Arc;

/// A fire-and-forget executor that propagates context to its delegate's
/// worker threads.
///
/// The delegate is held behind `Arc` and may be shared with undecorated
/// callers or with other decorators: every submission carries its own
/// independent snapshot, so composition against one delegate is safe.
pub struct ContextExecutor<C, E> {
    delegate: Arc<E>,
    holder: ContextHolder<C>,
    policy: ContextPolicy<C>,
}

impl<C, E> ContextExecutor<C, E>
where
    C: Clone + Send + Sync + 'static,
    E: Executor,
{
    /// Creates a decorator around `delegate` using the given policy.
    #[must_use]
    pub fn new(delegate: Arc<E>, holder: ContextHolder<C>, policy: ContextPolicy<C>) -> Self {
        Self {
            delegate,
            holder,
            policy,
        }
    }

    /// Convenience for a [`ContextPolicy::Fixed`] decorator carrying
    /// `context` on every submission.
    #[must_use]
    pub fn with_fixed_context(delegate: Arc<E>, holder: ContextHolder<C>, context: C) -> Self {
        Self::new(delegate, holder, ContextPolicy::fixed(context))
    }

    /// Returns the selection policy.
    #[must_use]
    pub fn policy(&self) -> &ContextPolicy<C> {
        &self.policy
    }

    /// Returns the wrapped delegate.
    #[must_use]
    pub fn delegate(&self) -> &Arc<E> {
        &self.delegate
    }
}

impl<C, E> Executor for ContextExecutor<C, E>
where
    C: Clone + Send + Sync + 'static,
    E: Executor,
{
    fn execute(&self, task: Box<dyn FnOnce() + Send>) -> Result<(), ContextflowError> {
        let snapshot = self.policy.select(&self.holder)?;
        self.delegate
            .execute(Box::new(decorate_procedure(&self.holder, snapshot, task)))
    }
}

impl<C, E> std::fmt::Debug for ContextExecutor<C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextExecutor")
            .field("holder", &self.holder)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecutorService;
    use crate::testing::FixedThreadPool;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_fixed_context_reaches_the_worker() {
        let pool = Arc::new(FixedThreadPool::new(1));
        let holder: ContextHolder<u64> = ContextHolder::new();
        let executor = ContextExecutor::with_fixed_context(pool.clone(), holder.clone(), 11);

        let observed = Arc::new(AtomicUsize::new(0));
        let sink = observed.clone();
        let reading = holder.clone();
        executor
            .execute(Box::new(move || {
                if let Ok(Some(value)) = reading.get() {
                    sink.store(value as usize, Ordering::SeqCst);
                }
            }))
            .unwrap();

        pool.shutdown();
        assert!(pool.await_termination(Duration::from_secs(5)));
        assert_eq!(observed.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn test_rejection_passes_through() {
        let pool = Arc::new(FixedThreadPool::new(1));
        pool.shutdown();
        assert!(pool.await_termination(Duration::from_secs(5)));

        let holder: ContextHolder<u64> = ContextHolder::new();
        let executor = ContextExecutor::new(pool, holder, ContextPolicy::current());
        let result = executor.execute(Box::new(|| {}));
        assert!(matches!(result, Err(ContextflowError::Rejected(_))));
    }
}
