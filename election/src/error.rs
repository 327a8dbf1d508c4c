use elect_fees::FeeError;
use elect_registry::RegistryError;
use elect_types::{Amount, ErrorKind, Principal, Timestamp};
use thiserror::Error;

use crate::phase::ElectionPhase;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ElectionError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Fees(#[from] FeeError),

    #[error("voter {0} is not registered")]
    NotRegistered(Principal),

    #[error("voter {0} is already registered")]
    AlreadyRegistered(Principal),

    #[error("voting is not open at {now}: election is {phase}")]
    InvalidPeriod { now: Timestamp, phase: ElectionPhase },

    #[error("free vote must not carry a payment, got {0}")]
    PaymentNotAccepted(Amount),

    #[error("no active candidates")]
    NoActiveCandidates,

    #[error("election cannot be finalized while {0}")]
    ElectionNotClosed(ElectionPhase),

    #[error("arithmetic overflow in voter counters")]
    Overflow,

    #[error("config error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("invariant violated: {0}")]
    InvariantViolated(String),
}

impl ElectionError {
    /// The abstract failure kind surfaced to the caller.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Registry(e) => e.kind(),
            Self::Fees(e) => e.kind(),
            Self::NotRegistered(_) => ErrorKind::NotRegistered,
            Self::AlreadyRegistered(_) => ErrorKind::AlreadyRegistered,
            Self::InvalidPeriod { .. } => ErrorKind::InvalidPeriod,
            Self::PaymentNotAccepted(_) => ErrorKind::PaymentNotAccepted,
            Self::NoActiveCandidates => ErrorKind::NoActiveCandidates,
            Self::ElectionNotClosed(_) => ErrorKind::ElectionNotClosed,
            Self::Overflow => ErrorKind::Overflow,
            Self::Config(_) | Self::Snapshot(_) | Self::InvariantViolated(_) => ErrorKind::Invalid,
        }
    }
}
