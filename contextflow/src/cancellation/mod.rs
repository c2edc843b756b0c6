//! Cooperative cancellation for wrapped units.
//!
//! Cancellation here is always cooperative: a token is flipped, interested
//! parties observe it or are notified, and nobody ever force-interrupts a
//! thread on cancellation's behalf.

mod token;

pub use token::CancellationToken;
