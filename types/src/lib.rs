//! Fundamental types for the election coordinator.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! principals, monetary amounts, timestamps and the clock seam, and the abstract
//! error taxonomy surfaced to callers.

pub mod address;
pub mod amount;
pub mod error;
pub mod time;

pub use address::Principal;
pub use amount::Amount;
pub use error::{ErrorKind, TypesError};
pub use time::{Clock, SystemClock, Timestamp};
