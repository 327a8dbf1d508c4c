//! Shared utilities for the election coordinator.

pub mod logging;
pub mod time;

pub use logging::{init_tracing_with, LogFormat};
pub use time::format_duration;
