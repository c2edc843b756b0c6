//! Decorator for the no-argument, no-result unit shape.

use crate::context::{ContextHolder, ContextSnapshot};

/// Wraps a procedure so it runs with `snapshot` installed.
///
/// The returned closure can be handed to any fire-and-forget executor; the
/// executing thread's prior holder value is restored when it finishes,
/// whether it returns normally or unwinds.
pub fn decorate_procedure<C, F>(
    holder: &ContextHolder<C>,
    snapshot: ContextSnapshot<C>,
    procedure: F,
) -> impl FnOnce() + Send + 'static
where
    C: Clone + Send + 'static,
    F: FnOnce() + Send + 'static,
{
    let holder = holder.clone();
    move || super::run_with_snapshot(&holder, &snapshot, procedure)
}
