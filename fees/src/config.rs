//! Vote pricing and quota limits.

use elect_types::Amount;
use serde::{Deserialize, Serialize};

/// Fee configuration: one instance per ledger, mutable only by the owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Minimum payment accepted for one paid vote.
    pub fee_amount: Amount,
    /// Votes each voter may cast without paying.
    pub free_vote_limit: u32,
    /// Paid votes each voter may buy after the free ones are used.
    pub max_paid_votes: u32,
}

impl FeeConfig {
    pub fn new(fee_amount: Amount, free_vote_limit: u32, max_paid_votes: u32) -> Self {
        Self {
            fee_amount,
            free_vote_limit,
            max_paid_votes,
        }
    }
}

impl Default for FeeConfig {
    /// One whole unit per paid vote, five free votes, ten paid votes.
    fn default() -> Self {
        Self::new(Amount::units(1), 5, 10)
    }
}
