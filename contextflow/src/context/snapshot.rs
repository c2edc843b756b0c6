//! Immutable captures of an ambient context.

use super::ContextHolder;
use crate::errors::ContextflowError;

/// An immutable capture of a context at one instant.
///
/// A snapshot either carries a context or is explicitly empty. Capturing
/// from an empty holder yields the empty snapshot rather than deferring to
/// whatever the holder happens to contain at execution time, which is what
/// prevents nondeterministic leakage on reused pool threads.
///
/// Capture clones the context, so later mutation of the live value never
/// retroactively changes an already-taken snapshot. Contexts with interior
/// mutability behind shared handles should be treated as read-only after
/// capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextSnapshot<C> {
    context: Option<C>,
}

impl<C: Clone + Send + 'static> ContextSnapshot<C> {
    /// Creates an explicitly empty snapshot.
    ///
    /// Installing it clears the executing thread's holder for the duration
    /// of the wrapped unit.
    #[must_use]
    pub fn empty() -> Self {
        Self { context: None }
    }

    /// Creates a snapshot of an explicitly supplied context.
    #[must_use]
    pub fn of(context: C) -> Self {
        Self {
            context: Some(context),
        }
    }

    /// Captures the holder's current value on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`ContextflowError::HolderUnavailable`] if the holder storage
    /// is inaccessible on this thread.
    pub fn capture(holder: &ContextHolder<C>) -> Result<Self, ContextflowError> {
        Ok(Self {
            context: holder.get()?,
        })
    }

    /// Returns true if this snapshot carries no context.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.context.is_none()
    }

    /// Returns the captured context, if any.
    #[must_use]
    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }

    /// Consumes the snapshot, returning the captured context.
    #[must_use]
    pub fn into_context(self) -> Option<C> {
        self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        let snapshot: ContextSnapshot<u64> = ContextSnapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.context(), None);
    }

    #[test]
    fn test_capture_of_empty_holder_is_explicitly_empty() {
        let holder: ContextHolder<u64> = ContextHolder::new();
        let snapshot = ContextSnapshot::capture(&holder).unwrap();
        assert!(snapshot.is_empty());

        // A later write to the holder must not change the capture.
        holder.set(9).unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_capture_is_defensive() {
        let holder = ContextHolder::new();
        holder.set(1_u64).unwrap();

        let snapshot = ContextSnapshot::capture(&holder).unwrap();
        holder.set(2).unwrap();

        assert_eq!(snapshot.context(), Some(&1));
    }

    #[test]
    fn test_into_context() {
        let snapshot = ContextSnapshot::of("ctx".to_string());
        assert_eq!(snapshot.into_context(), Some("ctx".to_string()));
    }
}
