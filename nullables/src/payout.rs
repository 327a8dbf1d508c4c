//! Nullable payout: records escrow transfers and can be told to fail.

use elect_fees::{PayoutError, PayoutSink};
use elect_types::{Amount, Principal};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
struct Inner {
    transfers: Vec<(Principal, Amount)>,
    fail_next: usize,
}

/// A payout sink for testing.
///
/// Successful transfers are recorded in order. `fail_next(n)` makes the next
/// `n` transfers fail without recording anything.
#[derive(Clone, Debug, Default)]
pub struct NullPayout {
    inner: Arc<Mutex<Inner>>,
}

impl NullPayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` transfers fail.
    pub fn fail_next(&self, count: usize) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_next = count;
    }

    /// Every successful transfer so far.
    pub fn transfers(&self) -> Vec<(Principal, Amount)> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .transfers
            .clone()
    }

    /// Total amount successfully paid to `who`.
    pub fn paid_to(&self, who: &Principal) -> Amount {
        self.transfers()
            .iter()
            .filter(|(p, _)| p == who)
            .fold(Amount::ZERO, |acc, (_, a)| acc.checked_add(*a).unwrap_or(acc))
    }
}

impl PayoutSink for NullPayout {
    fn transfer(&mut self, recipient: &Principal, amount: Amount) -> Result<(), PayoutError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.fail_next > 0 {
            inner.fail_next -= 1;
            return Err(PayoutError::Rejected(recipient.clone()));
        }
        inner.transfers.push((recipient.clone(), amount));
        Ok(())
    }
}
