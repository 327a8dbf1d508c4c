//! Winner determination.

use std::cmp::Reverse;

use elect_registry::{Candidate, CandidateId};
use elect_types::Principal;
use serde::{Deserialize, Serialize};

/// The leading active candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub id: CandidateId,
    pub name: String,
    pub address: Principal,
    pub total_votes: u64,
}

impl Winner {
    /// `(name, address, votes)`, the order clients render.
    pub fn into_tuple(self) -> (String, Principal, u64) {
        (self.name, self.address, self.total_votes)
    }
}

/// Pick the active candidate with the most votes. Ties go to the lowest id.
pub fn select<'a>(candidates: impl IntoIterator<Item = &'a Candidate>) -> Option<Winner> {
    candidates
        .into_iter()
        .filter(|c| c.active)
        .max_by_key(|c| (c.total_votes, Reverse(c.id)))
        .map(|c| Winner {
            id: c.id,
            name: c.name.clone(),
            address: c.address.clone(),
            total_votes: c.total_votes,
        })
}
