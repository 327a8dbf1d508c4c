//! Candidate registry.
//!
//! Owns candidate records and the single voting-period window. Every mutation
//! of the candidate set or the period is owner-only; vote tallies are only
//! ever changed by the election controller through [`CandidateRegistry::record_vote`].

pub mod candidate;
pub mod error;
pub mod period;
pub mod registry;

pub use candidate::{Candidate, CandidateDetails, CandidateId};
pub use error::RegistryError;
pub use period::VotingPeriod;
pub use registry::CandidateRegistry;
