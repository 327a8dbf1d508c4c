use elect_types::{ErrorKind, Principal, Timestamp};
use thiserror::Error;

use crate::candidate::CandidateId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("caller {caller} is not the registry owner")]
    Unauthorized { caller: Principal },

    #[error("invalid voting period: start {start} must precede end {end}")]
    InvalidPeriod { start: Timestamp, end: Timestamp },

    #[error("candidate {0} not found")]
    CandidateNotFound(CandidateId),

    #[error("candidate {0} is inactive")]
    CandidateInactive(CandidateId),

    #[error("candidate name must not be empty")]
    EmptyName,

    #[error("arithmetic overflow in registry counters")]
    Overflow,

    #[error("corrupt registry state: {0}")]
    Corrupt(String),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidPeriod { .. } => ErrorKind::InvalidPeriod,
            Self::CandidateNotFound(_) => ErrorKind::CandidateNotFound,
            Self::CandidateInactive(_) => ErrorKind::CandidateInactive,
            Self::EmptyName | Self::Corrupt(_) => ErrorKind::Invalid,
            Self::Overflow => ErrorKind::Overflow,
        }
    }
}
