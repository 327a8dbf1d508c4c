//! Shared error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors constructing the fundamental types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("principal identifier must not be empty")]
    EmptyPrincipal,

    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),
}

/// The abstract failure kinds surfaced to callers.
///
/// Every crate-level error maps onto exactly one kind, so a presentation layer
/// can branch on the kind without knowing which component raised it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Unauthorized,
    InvalidPeriod,
    CandidateNotFound,
    CandidateInactive,
    NotRegistered,
    AlreadyRegistered,
    InsufficientPayment,
    VoteQuotaExceeded,
    AlreadyReleased,
    TransferFailed,
    /// A free vote carried a nonzero payment.
    PaymentNotAccepted,
    /// No active candidate exists to determine a winner.
    NoActiveCandidates,
    /// Finalization attempted before the voting period ended.
    ElectionNotClosed,
    /// Checked arithmetic on a counter or balance overflowed.
    Overflow,
    /// Malformed configuration, snapshot, or input.
    Invalid,
}

impl ErrorKind {
    /// Stable name of the kind, as shown to callers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::InvalidPeriod => "InvalidPeriod",
            Self::CandidateNotFound => "CandidateNotFound",
            Self::CandidateInactive => "CandidateInactive",
            Self::NotRegistered => "NotRegistered",
            Self::AlreadyRegistered => "AlreadyRegistered",
            Self::InsufficientPayment => "InsufficientPayment",
            Self::VoteQuotaExceeded => "VoteQuotaExceeded",
            Self::AlreadyReleased => "AlreadyReleased",
            Self::TransferFailed => "TransferFailed",
            Self::PaymentNotAccepted => "PaymentNotAccepted",
            Self::NoActiveCandidates => "NoActiveCandidates",
            Self::ElectionNotClosed => "ElectionNotClosed",
            Self::Overflow => "Overflow",
            Self::Invalid => "Invalid",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
