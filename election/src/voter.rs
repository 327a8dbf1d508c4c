//! Voter records.

use elect_types::Principal;
use serde::{Deserialize, Serialize};

/// What the controller stores per voter. Paid-vote counters live in the fee
/// ledger and are joined in by [`Voter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRecord {
    pub registered: bool,
    pub free_votes_used: u32,
}

/// Full view of a voter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub principal: Principal,
    pub registered: bool,
    pub free_votes_used: u32,
    pub paid_votes_used: u32,
}

impl Voter {
    pub fn votes_cast(&self) -> u64 {
        self.free_votes_used as u64 + self.paid_votes_used as u64
    }
}
