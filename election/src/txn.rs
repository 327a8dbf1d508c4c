//! Atomic transaction over the controller's state.
//!
//! Every sub-step applied through an [`ElectionTxn`] is journaled. If the
//! transaction is dropped without [`ElectionTxn::commit`], the journal is
//! replayed in reverse and all staged events are discarded.

use std::collections::BTreeMap;

use elect_fees::{FeeLedger, PaidVote, PayoutSink};
use elect_registry::{CandidateId, CandidateRegistry};
use elect_types::{Amount, Principal};
use serde::{Deserialize, Serialize};

use crate::error::ElectionError;
use crate::event::ElectionEvent;
use crate::voter::VoterRecord;

/// Everything the controller mutates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct ElectionState {
    pub registry: CandidateRegistry,
    pub ledger: FeeLedger,
    pub voters: BTreeMap<Principal, VoterRecord>,
}

enum Undo {
    Tally(CandidateId),
    Payment(PaidVote),
    /// Previous record of a voter; `None` if the voter was unknown.
    Voter(Principal, Option<VoterRecord>),
}

pub(crate) struct ElectionTxn<'a> {
    state: &'a mut ElectionState,
    journal: Vec<Undo>,
    staged: Vec<ElectionEvent>,
    committed: bool,
}

impl<'a> ElectionTxn<'a> {
    pub fn begin(state: &'a mut ElectionState) -> Self {
        Self {
            state,
            journal: Vec::new(),
            staged: Vec::new(),
            committed: false,
        }
    }

    pub fn state(&self) -> &ElectionState {
        self.state
    }

    /// Registry access for single-step mutations that fail without side
    /// effects. Multi-step paths go through the journaled methods.
    pub fn registry_mut(&mut self) -> &mut CandidateRegistry {
        &mut self.state.registry
    }

    pub fn ledger_mut(&mut self) -> &mut FeeLedger {
        &mut self.state.ledger
    }

    pub fn register(&mut self, voter: &Principal) -> Result<(), ElectionError> {
        let previous = self.state.voters.get(voter).copied();
        if previous.is_some_and(|r| r.registered) {
            return Err(ElectionError::AlreadyRegistered(voter.clone()));
        }
        let record = VoterRecord {
            registered: true,
            ..previous.unwrap_or_default()
        };
        self.state.voters.insert(voter.clone(), record);
        self.journal.push(Undo::Voter(voter.clone(), previous));
        Ok(())
    }

    /// Consume one free vote; returns the voter's new free-vote count.
    pub fn use_free_vote(&mut self, voter: &Principal) -> Result<u32, ElectionError> {
        let previous = self
            .state
            .voters
            .get(voter)
            .copied()
            .ok_or_else(|| ElectionError::NotRegistered(voter.clone()))?;
        let used = previous
            .free_votes_used
            .checked_add(1)
            .ok_or(ElectionError::Overflow)?;
        self.state.voters.insert(
            voter.clone(),
            VoterRecord {
                free_votes_used: used,
                ..previous
            },
        );
        self.journal.push(Undo::Voter(voter.clone(), Some(previous)));
        Ok(used)
    }

    pub fn pay(&mut self, voter: &Principal, payment: Amount) -> Result<PaidVote, ElectionError> {
        let receipt = self.state.ledger.pay_to_vote(voter, payment)?;
        self.journal.push(Undo::Payment(receipt.clone()));
        Ok(receipt)
    }

    pub fn record_vote(&mut self, candidate: CandidateId) -> Result<u64, ElectionError> {
        let total = self.state.registry.record_vote(candidate)?;
        self.journal.push(Undo::Tally(candidate));
        Ok(total)
    }

    /// Release the escrow. This must be the last fallible step: a completed
    /// transfer cannot be journaled.
    pub fn release_funds(
        &mut self,
        caller: &Principal,
        recipient: &Principal,
        sink: &mut dyn PayoutSink,
    ) -> Result<Amount, ElectionError> {
        Ok(self.state.ledger.release_funds(caller, recipient, sink)?)
    }

    pub fn emit(&mut self, event: ElectionEvent) {
        self.staged.push(event);
    }

    /// Keep every applied step and hand back the staged events.
    pub fn commit(mut self) -> Vec<ElectionEvent> {
        self.committed = true;
        self.journal.clear();
        std::mem::take(&mut self.staged)
    }

    fn rollback(&mut self) {
        while let Some(undo) = self.journal.pop() {
            let result = match &undo {
                Undo::Tally(id) => self
                    .state
                    .registry
                    .revert_vote(*id)
                    .map(|_| ())
                    .map_err(ElectionError::from),
                Undo::Payment(receipt) => self
                    .state
                    .ledger
                    .revert_payment(receipt)
                    .map_err(ElectionError::from),
                Undo::Voter(voter, previous) => {
                    match previous {
                        Some(record) => self.state.voters.insert(voter.clone(), *record),
                        None => self.state.voters.remove(voter),
                    };
                    Ok(())
                }
            };
            if let Err(e) = result {
                tracing::error!(error = %e, "rollback step failed");
            }
        }
        if !self.staged.is_empty() {
            tracing::debug!(discarded = self.staged.len(), "transaction aborted");
        }
    }
}

impl Drop for ElectionTxn<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}
