//! The escrow payout mechanism.

use std::collections::HashMap;

use elect_types::{Amount, Principal};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayoutError {
    #[error("recipient {0} rejected the transfer")]
    Rejected(Principal),

    #[error("recipient balance overflow")]
    Overflow,

    #[error("{0}")]
    Other(String),
}

/// Moves released escrow to its recipient.
///
/// A failed transfer must leave the sink unchanged; the ledger then reports
/// `TransferFailed` and keeps the escrow intact.
pub trait PayoutSink: Send {
    fn transfer(&mut self, recipient: &Principal, amount: Amount) -> Result<(), PayoutError>;
}

/// In-memory balance book that credits released escrow to principals.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AccountBook {
    balances: HashMap<Principal, Amount>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, who: &Principal) -> Amount {
        self.balances.get(who).copied().unwrap_or(Amount::ZERO)
    }
}

impl PayoutSink for AccountBook {
    fn transfer(&mut self, recipient: &Principal, amount: Amount) -> Result<(), PayoutError> {
        let current = self.balance_of(recipient);
        let updated = current.checked_add(amount).ok_or(PayoutError::Overflow)?;
        self.balances.insert(recipient.clone(), updated);
        tracing::debug!(%recipient, %amount, "payout credited");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfers_accumulate_per_recipient() {
        let mut book = AccountBook::new();
        let alice = Principal::new("alice").unwrap();
        book.transfer(&alice, Amount::new(5)).unwrap();
        book.transfer(&alice, Amount::new(7)).unwrap();
        assert_eq!(book.balance_of(&alice), Amount::new(12));
        assert_eq!(book.balance_of(&Principal::new("bob").unwrap()), Amount::ZERO);
    }

    #[test]
    fn overflow_leaves_balance_unchanged() {
        let mut book = AccountBook::new();
        let alice = Principal::new("alice").unwrap();
        book.transfer(&alice, Amount::new(u128::MAX)).unwrap();
        assert_eq!(book.transfer(&alice, Amount::new(1)), Err(PayoutError::Overflow));
        assert_eq!(book.balance_of(&alice), Amount::new(u128::MAX));
    }
}
