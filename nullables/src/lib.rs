//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! The coordinator's external dependencies (the clock and the escrow payout
//! mechanism) are abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically, including injected failures
//! - Never touch the system clock, filesystem, or network
//!
//! Both types are cheap handles over shared state: clone one, hand the clone to
//! the controller, and keep steering it from the test.

pub mod clock;
pub mod payout;

pub use clock::NullClock;
pub use payout::NullPayout;
