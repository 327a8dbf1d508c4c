use elect_types::{Amount, ErrorKind, Principal};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeeError {
    #[error("caller {caller} is not the fee ledger owner")]
    Unauthorized { caller: Principal },

    #[error("insufficient payment: need {needed}, got {paid}")]
    InsufficientPayment { needed: Amount, paid: Amount },

    #[error("voter {voter} has used all {max} paid votes")]
    VoteQuotaExceeded { voter: Principal, max: u32 },

    #[error("escrow has already been released")]
    AlreadyReleased,

    #[error("escrow transfer to {recipient} failed: {reason}")]
    TransferFailed { recipient: Principal, reason: String },

    #[error("arithmetic overflow in fee ledger")]
    Overflow,
}

impl FeeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InsufficientPayment { .. } => ErrorKind::InsufficientPayment,
            Self::VoteQuotaExceeded { .. } => ErrorKind::VoteQuotaExceeded,
            Self::AlreadyReleased => ErrorKind::AlreadyReleased,
            Self::TransferFailed { .. } => ErrorKind::TransferFailed,
            Self::Overflow => ErrorKind::Overflow,
        }
    }
}
