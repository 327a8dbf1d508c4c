//! The election controller.

use std::collections::BTreeMap;
use std::sync::Arc;

use elect_fees::{Escrow, FeeConfig, FeeError, FeeLedger, PayoutSink};
use elect_registry::{CandidateDetails, CandidateId, CandidateRegistry, VotingPeriod};
use elect_types::{Amount, Clock, Principal, Timestamp};
use serde::{Deserialize, Serialize};

use crate::config::ElectionConfig;
use crate::error::ElectionError;
use crate::event::{ElectionEvent, EventBus, EventLog, EventRecord, VoteKind};
use crate::phase::ElectionPhase;
use crate::snapshot::{ElectionSnapshot, SNAPSHOT_VERSION};
use crate::txn::{ElectionState, ElectionTxn};
use crate::voter::{Voter, VoterRecord};
use crate::winner::{self, Winner};

/// Outcome of a successful [`ElectionController::vote`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub voter: Principal,
    pub candidate: CandidateId,
    pub kind: VoteKind,
    /// The candidate's tally after this vote.
    pub candidate_votes: u64,
    pub free_votes_used: u32,
    pub paid_votes_used: u32,
    /// Sequence number of the `VoteCast` event.
    pub seq: u64,
}

/// Coordinates voter registration and vote casting across the candidate
/// registry and the fee ledger.
///
/// Every mutating call reads the clock once, runs as one [`ElectionTxn`] and
/// publishes its events only after commit. `&mut self` serializes callers.
pub struct ElectionController {
    state: ElectionState,
    clock: Arc<dyn Clock>,
    payout: Box<dyn PayoutSink>,
    log: EventLog,
    bus: EventBus,
}

impl ElectionController {
    pub fn new(
        registry: CandidateRegistry,
        ledger: FeeLedger,
        clock: Arc<dyn Clock>,
        payout: Box<dyn PayoutSink>,
    ) -> Self {
        Self {
            state: ElectionState {
                registry,
                ledger,
                voters: BTreeMap::new(),
            },
            clock,
            payout,
            log: EventLog::new(),
            bus: EventBus::new(),
        }
    }

    /// Build both components from `config`, seeding the initial candidate if
    /// one is configured.
    pub fn from_config(
        config: &ElectionConfig,
        clock: Arc<dyn Clock>,
        payout: Box<dyn PayoutSink>,
    ) -> Result<Self, ElectionError> {
        config.validate()?;
        let period = config.voting_period()?;
        let owner = config.registry_owner().clone();
        let registry = match &config.initial_candidate {
            Some(initial) => CandidateRegistry::with_initial_candidate(
                owner,
                period,
                initial.name.clone(),
                initial.address.clone(),
            )?,
            None => CandidateRegistry::new(owner, period),
        };
        let ledger = FeeLedger::new(config.fee_owner().clone(), config.fee_config()?);
        tracing::info!(
            start = %period.start(),
            end = %period.end(),
            candidates = registry.len(),
            "election configured"
        );
        Ok(Self::new(registry, ledger, clock, payout))
    }

    /// Rebuild a controller from a snapshot after checking its integrity.
    pub fn restore(
        snapshot: ElectionSnapshot,
        clock: Arc<dyn Clock>,
        payout: Box<dyn PayoutSink>,
    ) -> Result<Self, ElectionError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(ElectionError::Snapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        let controller = Self {
            state: ElectionState {
                registry: snapshot.registry,
                ledger: snapshot.ledger,
                voters: snapshot.voters,
            },
            clock,
            payout,
            log: EventLog::from_records(snapshot.events)?,
            bus: EventBus::new(),
        };
        controller
            .check_invariants()
            .map_err(|e| ElectionError::Snapshot(e.to_string()))?;
        tracing::info!(events = controller.log.len(), "election restored");
        Ok(controller)
    }

    pub fn snapshot(&self) -> ElectionSnapshot {
        ElectionSnapshot {
            version: SNAPSHOT_VERSION,
            registry: self.state.registry.clone(),
            ledger: self.state.ledger.clone(),
            voters: self.state.voters.clone(),
            events: self.log.records().to_vec(),
        }
    }

    /// Append committed events to the log and notify subscribers. Returns the
    /// sequence number of the last event.
    fn publish(&mut self, at: Timestamp, events: Vec<ElectionEvent>) -> u64 {
        for event in events {
            let record = self.log.append(at, event);
            self.bus.emit(record);
        }
        self.log.last_seq()
    }

    fn phase_at(&self, now: Timestamp) -> ElectionPhase {
        ElectionPhase::at(
            &self.state.registry.voting_period(),
            self.state.ledger.escrow().released,
            now,
        )
    }

    // ── Voters ──────────────────────────────────────────────────────────

    /// Self-registration; allowed in every phase.
    pub fn register_voter(&mut self, caller: &Principal) -> Result<(), ElectionError> {
        let now = self.clock.now();
        let mut txn = ElectionTxn::begin(&mut self.state);
        txn.register(caller)?;
        txn.emit(ElectionEvent::VoterRegistered {
            voter: caller.clone(),
        });
        let events = txn.commit();
        tracing::info!(voter = %caller, "voter registered");
        self.publish(now, events);
        Ok(())
    }

    /// Cast one vote for `candidate`.
    ///
    /// Checks run in this order: voting window, registration, candidate, then
    /// quota. While free votes remain the vote is free and `payment` must be
    /// zero; afterwards it is paid through the fee ledger.
    pub fn vote(
        &mut self,
        caller: &Principal,
        candidate: CandidateId,
        payment: Amount,
    ) -> Result<VoteReceipt, ElectionError> {
        let now = self.clock.now();
        let phase = self.phase_at(now);
        if !phase.accepts_votes() {
            tracing::debug!(voter = %caller, %now, %phase, "vote outside voting period");
            return Err(ElectionError::InvalidPeriod { now, phase });
        }
        let record = self
            .state
            .voters
            .get(caller)
            .copied()
            .filter(|r| r.registered)
            .ok_or_else(|| ElectionError::NotRegistered(caller.clone()))?;
        self.state.registry.check_votable(candidate)?;
        let free_vote_limit = self.state.ledger.fee_config().free_vote_limit;

        let mut txn = ElectionTxn::begin(&mut self.state);
        let kind = if record.free_votes_used < free_vote_limit {
            if !payment.is_zero() {
                return Err(ElectionError::PaymentNotAccepted(payment));
            }
            txn.use_free_vote(caller)?;
            VoteKind::Free
        } else {
            txn.pay(caller, payment)?;
            VoteKind::Paid { payment }
        };
        let candidate_votes = txn.record_vote(candidate)?;
        txn.emit(ElectionEvent::VoteCast {
            voter: caller.clone(),
            candidate,
            kind,
            total_votes: candidate_votes,
        });
        let free_votes_used = txn
            .state()
            .voters
            .get(caller)
            .map(|r| r.free_votes_used)
            .unwrap_or(0);
        let paid_votes_used = txn.state().ledger.total_paid_votes(caller);
        let events = txn.commit();

        tracing::info!(
            voter = %caller,
            candidate,
            ?kind,
            candidate_votes,
            "vote cast"
        );
        let seq = self.publish(now, events);
        Ok(VoteReceipt {
            voter: caller.clone(),
            candidate,
            kind,
            candidate_votes,
            free_votes_used,
            paid_votes_used,
            seq,
        })
    }

    // ── Registry administration ─────────────────────────────────────────

    pub fn add_candidate(
        &mut self,
        caller: &Principal,
        name: impl Into<String>,
        address: Principal,
    ) -> Result<CandidateId, ElectionError> {
        let now = self.clock.now();
        let name = name.into();
        let mut txn = ElectionTxn::begin(&mut self.state);
        let id = txn
            .registry_mut()
            .add_candidate(caller, name.clone(), address.clone())?;
        txn.emit(ElectionEvent::CandidateAdded { id, name, address });
        let events = txn.commit();
        self.publish(now, events);
        Ok(id)
    }

    /// Returns whether the candidate changed state. Repeating the call on an
    /// inactive candidate succeeds and publishes nothing.
    pub fn deactivate_candidate(
        &mut self,
        caller: &Principal,
        id: CandidateId,
    ) -> Result<bool, ElectionError> {
        let now = self.clock.now();
        let mut txn = ElectionTxn::begin(&mut self.state);
        let changed = txn.registry_mut().deactivate_candidate(caller, id)?;
        if changed {
            txn.emit(ElectionEvent::CandidateDeactivated { id });
        }
        let events = txn.commit();
        self.publish(now, events);
        Ok(changed)
    }

    /// Replace the voting period. Allowed in every phase; the phase is
    /// recomputed from the new window on the next call.
    pub fn update_voting_period(
        &mut self,
        caller: &Principal,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<VotingPeriod, ElectionError> {
        let now = self.clock.now();
        let mut txn = ElectionTxn::begin(&mut self.state);
        let period = txn.registry_mut().update_voting_period(caller, start, end)?;
        txn.emit(ElectionEvent::VotingPeriodUpdated { start, end });
        let events = txn.commit();
        self.publish(now, events);
        Ok(period)
    }

    // ── Fee administration ──────────────────────────────────────────────

    /// Returns the previous fee.
    pub fn update_fees(&mut self, caller: &Principal, fee: Amount) -> Result<Amount, ElectionError> {
        let now = self.clock.now();
        let mut txn = ElectionTxn::begin(&mut self.state);
        let previous = txn.ledger_mut().update_fees(caller, fee)?;
        txn.emit(ElectionEvent::FeeUpdated { fee });
        let events = txn.commit();
        self.publish(now, events);
        Ok(previous)
    }

    /// Returns the previous ceiling.
    pub fn update_max_paid_votes(
        &mut self,
        caller: &Principal,
        max: u32,
    ) -> Result<u32, ElectionError> {
        let now = self.clock.now();
        let mut txn = ElectionTxn::begin(&mut self.state);
        let previous = txn.ledger_mut().update_max_paid_votes(caller, max)?;
        txn.emit(ElectionEvent::MaxPaidVotesUpdated { max });
        let events = txn.commit();
        self.publish(now, events);
        Ok(previous)
    }

    /// Transfer the whole escrow to `recipient`. The owner picks the recipient;
    /// see [`finalize`](Self::finalize) for paying the computed winner.
    pub fn release_funds(
        &mut self,
        caller: &Principal,
        recipient: &Principal,
    ) -> Result<Amount, ElectionError> {
        let now = self.clock.now();
        let mut txn = ElectionTxn::begin(&mut self.state);
        let amount = txn.release_funds(caller, recipient, self.payout.as_mut())?;
        txn.emit(ElectionEvent::FundsReleased {
            recipient: recipient.clone(),
            amount,
        });
        let events = txn.commit();
        self.publish(now, events);
        Ok(amount)
    }

    /// Close out the election: pay the escrow to the current winner.
    ///
    /// Requires the fee owner and a closed voting period.
    pub fn finalize(&mut self, caller: &Principal) -> Result<(Winner, Amount), ElectionError> {
        let now = self.clock.now();
        if caller != self.state.ledger.owner() {
            tracing::warn!(%caller, "finalize rejected: not owner");
            return Err(FeeError::Unauthorized {
                caller: caller.clone(),
            }
            .into());
        }
        match self.phase_at(now) {
            ElectionPhase::Closed => {}
            ElectionPhase::Finalized => return Err(FeeError::AlreadyReleased.into()),
            phase => return Err(ElectionError::ElectionNotClosed(phase)),
        }
        let winner = self.winner()?;
        let amount = self.release_funds(caller, &winner.address)?;
        tracing::info!(
            winner = winner.id,
            address = %winner.address,
            votes = winner.total_votes,
            %amount,
            "election finalized"
        );
        Ok((winner, amount))
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn phase(&self) -> ElectionPhase {
        self.phase_at(self.clock.now())
    }

    /// The active candidate with the most votes; ties go to the lowest id.
    ///
    /// Computable in any phase, final only once the election is closed.
    pub fn winner(&self) -> Result<Winner, ElectionError> {
        winner::select(self.state.registry.active_candidates())
            .ok_or(ElectionError::NoActiveCandidates)
    }

    /// Every candidate id, inactive included, in registration order.
    pub fn candidates(&self) -> Vec<CandidateId> {
        self.state.registry.all_candidates()
    }

    pub fn candidate_details(&self, id: CandidateId) -> Result<CandidateDetails, ElectionError> {
        Ok(self.state.registry.candidate_details(id)?)
    }

    pub fn total_paid_votes(&self, voter: &Principal) -> u32 {
        self.state.ledger.total_paid_votes(voter)
    }

    /// View of `principal`, unregistered and with zero counters if unknown.
    pub fn voter(&self, principal: &Principal) -> Voter {
        let record = self
            .state
            .voters
            .get(principal)
            .copied()
            .unwrap_or_default();
        Voter {
            principal: principal.clone(),
            registered: record.registered,
            free_votes_used: record.free_votes_used,
            paid_votes_used: self.state.ledger.total_paid_votes(principal),
        }
    }

    /// Every known voter in principal order.
    pub fn voters(&self) -> Vec<Voter> {
        self.state.voters.keys().map(|p| self.voter(p)).collect()
    }

    pub fn fee_config(&self) -> FeeConfig {
        self.state.ledger.fee_config()
    }

    pub fn escrow(&self) -> Escrow {
        self.state.ledger.escrow()
    }

    pub fn voting_period(&self) -> VotingPeriod {
        self.state.registry.voting_period()
    }

    // ── Events ──────────────────────────────────────────────────────────

    pub fn events(&self) -> &[EventRecord] {
        self.log.records()
    }

    /// Events committed after sequence number `seq`.
    pub fn events_since(&self, seq: u64) -> &[EventRecord] {
        self.log.since(seq)
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&EventRecord) + Send + Sync>) {
        self.bus.subscribe(listener);
    }

    // ── Integrity ───────────────────────────────────────────────────────

    /// Verify the cross-component invariants:
    /// - candidate tallies sum to the free plus paid votes of all voters
    /// - no voter exceeds the free-vote limit
    /// - every paid vote belongs to a registered voter
    /// - a released escrow holds nothing
    ///
    /// Paid votes are not checked against the current ceiling: lowering it
    /// leaves existing counters above it.
    pub fn check_invariants(&self) -> Result<(), ElectionError> {
        self.state
            .registry
            .check_integrity()
            .map_err(|e| ElectionError::InvariantViolated(e.to_string()))?;

        let free: u64 = self
            .state
            .voters
            .values()
            .map(|r| r.free_votes_used as u64)
            .sum();
        let cast = free
            .checked_add(self.state.ledger.paid_votes_sum())
            .ok_or(ElectionError::Overflow)?;
        let tallied = self.state.registry.total_votes();
        if cast != tallied {
            return Err(ElectionError::InvariantViolated(format!(
                "{tallied} votes tallied but {cast} cast"
            )));
        }

        let limit = self.state.ledger.fee_config().free_vote_limit;
        for (principal, record) in &self.state.voters {
            check_voter(principal, record, limit)?;
        }
        for (principal, _) in self.state.ledger.paid_voters() {
            if !self.state.voters.get(principal).is_some_and(|r| r.registered) {
                return Err(ElectionError::InvariantViolated(format!(
                    "unregistered voter {principal} holds paid votes"
                )));
            }
        }

        let escrow = self.state.ledger.escrow();
        if escrow.released && !escrow.balance.is_zero() {
            return Err(ElectionError::InvariantViolated(format!(
                "released escrow still holds {}",
                escrow.balance
            )));
        }
        Ok(())
    }
}

fn check_voter(principal: &Principal, record: &VoterRecord, limit: u32) -> Result<(), ElectionError> {
    if record.free_votes_used > limit {
        return Err(ElectionError::InvariantViolated(format!(
            "voter {principal} used {} free votes, limit {limit}",
            record.free_votes_used
        )));
    }
    if !record.registered && record.free_votes_used > 0 {
        return Err(ElectionError::InvariantViolated(format!(
            "unregistered voter {principal} cast free votes"
        )));
    }
    Ok(())
}
