//! Candidate records.

use elect_types::Principal;
use serde::{Deserialize, Serialize};

/// Sequential candidate identifier, starting at 1.
pub type CandidateId = u64;

/// A registered candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    /// Account that receives escrowed funds if this candidate wins.
    pub address: Principal,
    pub total_votes: u64,
    /// Flips to false on deactivation and never back.
    pub active: bool,
}

impl Candidate {
    pub(crate) fn new(id: CandidateId, name: String, address: Principal) -> Self {
        Self {
            id,
            name,
            address,
            total_votes: 0,
            active: true,
        }
    }

    pub fn details(&self) -> CandidateDetails {
        CandidateDetails {
            id: self.id,
            address: self.address.clone(),
            name: self.name.clone(),
            total_votes: self.total_votes,
            active: self.active,
        }
    }
}

/// Read-only view returned by `candidate_details`, in the field order clients
/// render: `(id, address, name, total_votes, active)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDetails {
    pub id: CandidateId,
    pub address: Principal,
    pub name: String,
    pub total_votes: u64,
    pub active: bool,
}

impl CandidateDetails {
    pub fn into_tuple(self) -> (CandidateId, Principal, String, u64, bool) {
        (self.id, self.address, self.name, self.total_votes, self.active)
    }
}
