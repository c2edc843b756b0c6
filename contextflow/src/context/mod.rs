//! Context management: the holder, snapshots, scopes, and selection policy.
//!
//! This module provides:
//! - A thread-confined holder for the currently active context
//! - Immutable snapshots capturing a context at one instant
//! - A scope type that installs a snapshot and restores the prior value
//! - The policy deciding which snapshot a submission carries

mod holder;
mod policy;
mod scope;
mod snapshot;

pub use holder::ContextHolder;
pub use policy::ContextPolicy;
pub use scope::ContextScope;
pub use snapshot::ContextSnapshot;
