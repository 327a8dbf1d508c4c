//! Fee ledger.
//!
//! Owns the fee configuration, every voter's paid-vote counter, and the escrow
//! that accumulates accepted payments until a single release to the winner.
//!
//! The escrow balance only ever changes in two places: [`FeeLedger::pay_to_vote`]
//! adds to it and [`FeeLedger::release_funds`] zeroes it through a [`PayoutSink`].

pub mod config;
pub mod error;
pub mod escrow;
pub mod ledger;
pub mod payout;

pub use config::FeeConfig;
pub use error::FeeError;
pub use escrow::Escrow;
pub use ledger::{FeeLedger, PaidVote};
pub use payout::{AccountBook, PayoutError, PayoutSink};
