//! Scoped install/restore of a snapshot on the executing thread.

use super::{ContextHolder, ContextSnapshot};
use crate::errors::ContextflowError;
use tracing::warn;

/// A scope that installs a snapshot and restores the prior value on drop.
///
/// Entering the scope records the thread's pre-existing holder value and
/// installs the snapshot. Dropping the scope restores the recorded value on
/// every exit path: normal return, unwind, and post-start cancellation. The
/// restore replaces rather than clears, so a legitimately nested context is
/// not clobbered and a reused pool thread retains no stale state.
///
/// A failure during the restore step never masks the unit's own outcome; it
/// is reported through `tracing::warn!` instead.
#[must_use = "the scope restores the prior context when dropped"]
pub struct ContextScope<'a, C: Clone + Send + 'static> {
    holder: &'a ContextHolder<C>,
    prior: Option<C>,
}

impl<'a, C: Clone + Send + 'static> ContextScope<'a, C> {
    /// Installs the snapshot on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`ContextflowError::HolderUnavailable`] if the holder storage
    /// is inaccessible; in that case nothing was installed.
    pub fn enter(
        holder: &'a ContextHolder<C>,
        snapshot: &ContextSnapshot<C>,
    ) -> Result<Self, ContextflowError> {
        let prior = holder.replace(snapshot.context().cloned())?;
        Ok(Self { holder, prior })
    }

    /// Returns the value that was active before this scope was entered.
    #[must_use]
    pub fn prior(&self) -> Option<&C> {
        self.prior.as_ref()
    }
}

impl<C: Clone + Send + 'static> Drop for ContextScope<'_, C> {
    fn drop(&mut self) {
        let prior = std::mem::take(&mut self.prior);
        if let Err(error) = self.holder.replace(prior) {
            warn!(%error, "failed to restore the prior context after a wrapped unit");
        }
    }
}
