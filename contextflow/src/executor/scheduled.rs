//! Decorator for the delayed/periodic executor shape.

use super::ScheduledExecutor;
use crate::cancellation::CancellationToken;
use crate::context::{ContextHolder, ContextPolicy};
use crate::errors::ContextflowError;
use crate::task::decorate_procedure;
use std::sync::Arc;
use std::time::Duration;

/// A cancellable handle to a scheduled (possibly repeating) task.
#[derive(Clone, Debug)]
pub struct ScheduledHandle {
    token: Arc<CancellationToken>,
}

impl ScheduledHandle {
    /// Creates a handle around a cancellation token.
    #[must_use]
    pub fn new(token: Arc<CancellationToken>) -> Self {
        Self { token }
    }

    /// Requests cancellation. Before the first run this is a true no-op for
    /// the context holder; mid-run it is cooperative.
    pub fn cancel(&self, reason: impl Into<String>) {
        self.token.cancel(reason);
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Returns the underlying token, for cooperative observation.
    #[must_use]
    pub fn token(&self) -> &Arc<CancellationToken> {
        &self.token
    }
}

/// A scheduled executor that propagates context to delayed and periodic
/// tasks.
///
/// The snapshot is selected once, at the scheduling call, under both
/// policies; a repeating task does not re-capture per tick (a caller needing
/// a fresh context per repetition re-submits explicitly). Each individual
/// execution still runs the full install/restore protocol, so a long-lived
/// repeating task never keeps a context installed between executions.
pub struct ContextScheduledExecutor<C, S> {
    delegate: Arc<S>,
    holder: ContextHolder<C>,
    policy: ContextPolicy<C>,
}

impl<C, S> ContextScheduledExecutor<C, S>
where
    C: Clone + Send + Sync + 'static,
    S: ScheduledExecutor,
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
}

impl<C, S> ScheduledExecutor for ContextScheduledExecutor<C, S>
where
    C: Clone + Send + Sync + 'static,
    S: ScheduledExecutor,
{
    fn schedule_once(
        &self,
        delay: Duration,
        task: Box<dyn FnOnce() + Send>,
    ) -> Result<ScheduledHandle, ContextflowError> {
        let snapshot = self.policy.select(&self.holder)?;
        self.delegate
            .schedule_once(delay, Box::new(decorate_procedure(&self.holder, snapshot, task)))
    }

    fn schedule_at_fixed_rate(
        &self,
        initial_delay: Duration,
        period: Duration,
        task: Box<dyn Fn() + Send>,
    ) -> Result<ScheduledHandle, ContextflowError> {
        let snapshot = self.policy.select(&self.holder)?;
        let holder = self.holder.clone();
        let wrapped = move || {
            crate::task::run_with_snapshot(&holder, &snapshot, || task());
        };
        self.delegate
            .schedule_at_fixed_rate(initial_delay, period, Box::new(wrapped))
    }
}

impl<C, S> std::fmt::Debug for ContextScheduledExecutor<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextScheduledExecutor")
            .field("holder", &self.holder)
            .finish()
    }
}
