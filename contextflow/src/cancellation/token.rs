//! Cancellation token for cooperative cancellation.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// A token for cooperative cancellation.
///
/// Cancellation is idempotent: only the first reason is kept. Registered
/// callbacks fire exactly once, on the thread that wins the cancel race, and
/// are released afterwards. A callback registered after cancellation fires
/// immediately on the registering thread.
#[derive(Default)]
pub struct CancellationToken {
    cancelled: AtomicBool,
    reason: Mutex<Option<String>>,
    callbacks: Mutex<Vec<Box<dyn Fn() + Send + Sync>>>,
}

impl CancellationToken {
    /// Creates a new, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation with a reason. First reason wins.
    ///
    /// Panics in callbacks are contained and logged so one misbehaving
    /// callback cannot block the others.
    pub fn cancel(&self, reason: impl Into<String>) {
        if self
            .cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            *self.reason.lock() = Some(reason.into());
            let callbacks = std::mem::take(&mut *self.callbacks.lock());
            for callback in callbacks {
                Self::invoke(&*callback);
            }
        }
    }

    /// Registers a callback to run when cancellation is requested.
    ///
    /// If the token is already cancelled the callback runs immediately.
    pub fn on_cancel<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        if self.is_cancelled() {
            Self::invoke(&callback);
        } else {
            self.callbacks.lock().push(Box::new(callback));
            // The cancel may have raced in between; fire what we just stored.
            if self.is_cancelled() {
                let callbacks = std::mem::take(&mut *self.callbacks.lock());
                for callback in callbacks {
                    Self::invoke(&*callback);
                }
            }
        }
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the cancellation reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.lock().clone()
    }

    fn invoke(callback: &(dyn Fn() + Send + Sync)) {
        if let Err(panic) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(callback)) {
            warn!(?panic, "cancellation callback panicked");
        }
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_token_starts_uncancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.reason().is_none());
    }

    #[test]
    fn test_first_reason_wins() {
        let token = CancellationToken::new();
        token.cancel("first");
        token.cancel("second");
        assert_eq!(token.reason(), Some("first".to_string()));
    }

    #[test]
    fn test_callback_fires_on_cancel() {
        let token = CancellationToken::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = fired.clone();
        token.on_cancel(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        token.cancel("done");
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Callbacks are released after firing; a second cancel is a no-op.
        token.cancel("again");
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_registered_after_cancel_fires_immediately() {
        let token = CancellationToken::new();
        token.cancel("early");

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        token.on_cancel(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_callback_is_contained() {
        let token = CancellationToken::new();
        token.on_cancel(|| panic!("intentional"));
        token.cancel("test");
        assert!(token.is_cancelled());
    }
}
