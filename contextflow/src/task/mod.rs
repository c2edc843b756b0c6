//! Task decorators: one unit of work wrapped in the install/restore protocol.
//!
//! Three unit shapes share the same protocol:
//! - [`decorate_procedure`] for a no-argument, no-result action
//! - [`decorate_value`] for a no-argument computation producing a value
//! - [`decorate_cancellable`] for a computation paired with a token
//!
//! Each wrapper, on whichever thread ends up running it, records the
//! pre-existing holder value, installs its snapshot, invokes the unit, and
//! restores the recorded value on every exit path.

mod cancellable;
mod procedure;
mod value;

pub use cancellable::{decorate_cancellable, CancelOutcome};
pub use procedure::decorate_procedure;
pub use value::decorate_value;

use crate::context::{ContextHolder, ContextScope, ContextSnapshot};
use tracing::warn;

/// Runs `unit` with `snapshot` installed, restoring the prior value after.
///
/// If the install itself fails (holder storage torn down on the executing
/// thread) the unit still runs, without ambient context, and a warning is
/// logged; swallowing the unit would be worse than running it bare.
pub(crate) fn run_with_snapshot<C, R>(
    holder: &ContextHolder<C>,
    snapshot: &ContextSnapshot<C>,
    unit: impl FnOnce() -> R,
) -> R
where
    C: Clone + Send + 'static,
{
    match ContextScope::enter(holder, snapshot) {
        Ok(scope) => {
            let result = unit();
            drop(scope);
            result
        }
        Err(error) => {
            warn!(%error, "context install failed; running the unit without ambient context");
            unit()
        }
    }
}
