//! Decorator for the cancellable unit shape.

use crate::cancellation::CancellationToken;
use crate::context::{ContextHolder, ContextSnapshot};
use std::sync::Arc;

/// Outcome of a cancellable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome<R> {
    /// The unit ran to completion and produced this value.
    Completed(R),
    /// Cancellation was requested before the protocol began; the unit never
    /// ran and no thread's holder was touched.
    Skipped,
}

impl<R> CancelOutcome<R> {
    /// Returns true if the unit was skipped before starting.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }

    /// Returns the produced value, if the unit completed.
    pub fn completed(self) -> Option<R> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Skipped => None,
        }
    }
}

/// Wraps a cancellable computation so it runs with `snapshot` installed.
///
/// Cancellation before the wrapper starts is a true no-op: the holder is
/// never written and [`CancelOutcome::Skipped`] comes back. Cancellation
/// during execution is the unit's own business, observed through the token
/// it is handed; the restore step still runs once execution actually stops.
pub fn decorate_cancellable<C, R, F>(
    holder: &ContextHolder<C>,
    snapshot: ContextSnapshot<C>,
    token: Arc<CancellationToken>,
    unit: F,
) -> impl FnOnce() -> CancelOutcome<R> + Send + 'static
where
    C: Clone + Send + 'static,
    R: 'static,
    F: FnOnce(&CancellationToken) -> R + Send + 'static,
{
    let holder = holder.clone();
    move || {
        if token.is_cancelled() {
            return CancelOutcome::Skipped;
        }
        CancelOutcome::Completed(super::run_with_snapshot(&holder, &snapshot, || unit(&token)))
    }
}
