//! The fee ledger component.

use std::collections::BTreeMap;

use elect_types::{Amount, Principal};
use serde::{Deserialize, Serialize};

use crate::config::FeeConfig;
use crate::error::FeeError;
use crate::escrow::Escrow;
use crate::payout::PayoutSink;

/// Receipt for one accepted paid vote, used to undo it if the enclosing
/// transaction aborts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaidVote {
    pub voter: Principal,
    pub payment: Amount,
    /// The voter's paid-vote count after this payment.
    pub paid_votes_used: u32,
}

/// Fee configuration, per-voter paid-vote accounting and escrow custody.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeeLedger {
    owner: Principal,
    config: FeeConfig,
    paid_votes: BTreeMap<Principal, u32>,
    escrow: Escrow,
}

impl FeeLedger {
    pub fn new(owner: Principal, config: FeeConfig) -> Self {
        Self {
            owner,
            config,
            paid_votes: BTreeMap::new(),
            escrow: Escrow::default(),
        }
    }

    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    pub fn fee_config(&self) -> FeeConfig {
        self.config
    }

    pub fn escrow(&self) -> Escrow {
        self.escrow
    }

    fn ensure_owner(&self, caller: &Principal) -> Result<(), FeeError> {
        if caller != &self.owner {
            tracing::warn!(%caller, "fee ledger call rejected: not owner");
            return Err(FeeError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    // ── Paid votes ──────────────────────────────────────────────────────

    /// Accept a payment for one paid vote on behalf of `voter`.
    ///
    /// The whole payment is escrowed, including any amount above the fee.
    /// Payments stop being accepted once the escrow has been released.
    pub fn pay_to_vote(&mut self, voter: &Principal, payment: Amount) -> Result<PaidVote, FeeError> {
        if self.escrow.released {
            return Err(FeeError::AlreadyReleased);
        }
        if payment < self.config.fee_amount {
            return Err(FeeError::InsufficientPayment {
                needed: self.config.fee_amount,
                paid: payment,
            });
        }
        let used = self.total_paid_votes(voter);
        if used >= self.config.max_paid_votes {
            return Err(FeeError::VoteQuotaExceeded {
                voter: voter.clone(),
                max: self.config.max_paid_votes,
            });
        }
        let paid_votes_used = used.checked_add(1).ok_or(FeeError::Overflow)?;
        let balance = self
            .escrow
            .balance
            .checked_add(payment)
            .ok_or(FeeError::Overflow)?;

        self.paid_votes.insert(voter.clone(), paid_votes_used);
        self.escrow.balance = balance;
        tracing::info!(%voter, %payment, paid_votes_used, "paid vote accepted");
        Ok(PaidVote {
            voter: voter.clone(),
            payment,
            paid_votes_used,
        })
    }

    /// Undo an accepted paid vote.
    pub fn revert_payment(&mut self, receipt: &PaidVote) -> Result<(), FeeError> {
        let used = self.total_paid_votes(&receipt.voter);
        let reverted = used.checked_sub(1).ok_or(FeeError::Overflow)?;
        let balance = self
            .escrow
            .balance
            .checked_sub(receipt.payment)
            .ok_or(FeeError::Overflow)?;
        if reverted == 0 {
            self.paid_votes.remove(&receipt.voter);
        } else {
            self.paid_votes.insert(receipt.voter.clone(), reverted);
        }
        self.escrow.balance = balance;
        tracing::debug!(voter = %receipt.voter, payment = %receipt.payment, "paid vote reverted");
        Ok(())
    }

    pub fn total_paid_votes(&self, voter: &Principal) -> u32 {
        self.paid_votes.get(voter).copied().unwrap_or(0)
    }

    /// Paid votes across every voter.
    pub fn paid_votes_sum(&self) -> u64 {
        self.paid_votes.values().map(|v| *v as u64).sum()
    }

    pub fn paid_voters(&self) -> impl Iterator<Item = (&Principal, u32)> {
        self.paid_votes.iter().map(|(p, n)| (p, *n))
    }

    // ── Owner-only configuration ────────────────────────────────────────

    /// Replace the fee; returns the previous one.
    pub fn update_fees(&mut self, caller: &Principal, new_fee: Amount) -> Result<Amount, FeeError> {
        self.ensure_owner(caller)?;
        let previous = self.config.fee_amount;
        self.config.fee_amount = new_fee;
        tracing::info!(%previous, fee = %new_fee, "vote fee updated");
        Ok(previous)
    }

    /// Replace the paid-vote ceiling; returns the previous one.
    ///
    /// Voters already at or above a lowered ceiling keep their votes but cannot
    /// buy more.
    pub fn update_max_paid_votes(&mut self, caller: &Principal, max: u32) -> Result<u32, FeeError> {
        self.ensure_owner(caller)?;
        let previous = self.config.max_paid_votes;
        self.config.max_paid_votes = max;
        tracing::info!(previous, max, "paid vote ceiling updated");
        Ok(previous)
    }

    // ── Escrow release ──────────────────────────────────────────────────

    /// Transfer the full escrow balance to `winner` and latch the escrow.
    ///
    /// Nothing changes if the sink fails.
    pub fn release_funds(
        &mut self,
        caller: &Principal,
        winner: &Principal,
        sink: &mut dyn PayoutSink,
    ) -> Result<Amount, FeeError> {
        self.ensure_owner(caller)?;
        if self.escrow.released {
            return Err(FeeError::AlreadyReleased);
        }
        let amount = self.escrow.balance;
        sink.transfer(winner, amount).map_err(|e| {
            tracing::warn!(%winner, %amount, error = %e, "escrow transfer failed");
            FeeError::TransferFailed {
                recipient: winner.clone(),
                reason: e.to_string(),
            }
        })?;
        self.escrow = Escrow {
            balance: Amount::ZERO,
            released: true,
        };
        tracing::info!(%winner, %amount, "escrow released");
        Ok(amount)
    }
}
