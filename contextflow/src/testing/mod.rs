//! Testing utilities: delegate executors for exercising the decorators.
//!
//! Production pools and schedulers are external collaborators; these small
//! delegates exist so the decorator family can be driven end to end in
//! tests and examples.

mod pool;
mod timer;

pub use pool::FixedThreadPool;
pub use timer::TimerPool;
