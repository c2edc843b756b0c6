//! Selection of which snapshot a submission should carry.

use super::{ContextHolder, ContextSnapshot};
use crate::errors::ContextflowError;

/// Policy deciding which snapshot a given submission uses.
///
/// The policy is fixed at decorator construction and immutable afterwards;
/// it is evaluated once per submission, never re-evaluated on retry.
#[derive(Debug, Clone)]
pub enum ContextPolicy<C> {
    /// Every submission, from any thread, carries this one snapshot.
    ///
    /// Built with the empty snapshot this means "always run cleared".
    Fixed(ContextSnapshot<C>),

    /// Each submission captures the submitting thread's live context at the
    /// instant of the call. An empty holder at that instant yields an
    /// explicitly empty snapshot, never a later-observed value.
    Current,
}

impl<C: Clone + Send + 'static> ContextPolicy<C> {
    /// A fixed policy carrying the given context.
    #[must_use]
    pub fn fixed(context: C) -> Self {
        Self::Fixed(ContextSnapshot::of(context))
    }

    /// A fixed policy that always runs units with a cleared holder.
    #[must_use]
    pub fn cleared() -> Self {
        Self::Fixed(ContextSnapshot::empty())
    }

    /// The capture-at-submission policy.
    #[must_use]
    pub fn current() -> Self {
        Self::Current
    }

    /// Produces the snapshot for one submission happening right now.
    ///
    /// # Errors
    ///
    /// Returns [`ContextflowError::HolderUnavailable`] if capture is needed
    /// and the holder is inaccessible on the submitting thread. This
    /// surfaces synchronously, before anything reaches the delegate.
    pub fn select(
        &self,
        holder: &ContextHolder<C>,
    ) -> Result<ContextSnapshot<C>, ContextflowError> {
        match self {
            Self::Fixed(snapshot) => Ok(snapshot.clone()),
            Self::Current => ContextSnapshot::capture(holder),
        }
    }
}
