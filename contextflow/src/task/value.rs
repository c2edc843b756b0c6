//! Decorator for the value-producing unit shape.

use crate::context::{ContextHolder, ContextSnapshot};

/// Wraps a value computation so it runs with `snapshot` installed.
///
/// The computation's result flows through untouched. A fallible unit simply
/// returns a `Result` as its value: its error keeps its original type and
/// content, the wrapper never re-wraps it into something else.
pub fn decorate_value<C, R, F>(
    holder: &ContextHolder<C>,
    snapshot: ContextSnapshot<C>,
    computation: F,
) -> impl FnOnce() -> R + Send + 'static
where
    C: Clone + Send + 'static,
    R: 'static,
    F: FnOnce() -> R + Send + 'static,
{
    let holder = holder.clone();
    move || super::run_with_snapshot(&holder, &snapshot, computation)
}
