//! Committed state transitions, for observers.

use elect_registry::CandidateId;
use elect_types::{Amount, Principal, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::ElectionError;

/// How a vote was paid for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteKind {
    Free,
    Paid { payment: Amount },
}

/// A state transition that has been committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionEvent {
    CandidateAdded {
        id: CandidateId,
        name: String,
        address: Principal,
    },
    CandidateDeactivated {
        id: CandidateId,
    },
    VotingPeriodUpdated {
        start: Timestamp,
        end: Timestamp,
    },
    VoterRegistered {
        voter: Principal,
    },
    VoteCast {
        voter: Principal,
        candidate: CandidateId,
        kind: VoteKind,
        total_votes: u64,
    },
    FeeUpdated {
        fee: Amount,
    },
    MaxPaidVotesUpdated {
        max: u32,
    },
    FundsReleased {
        recipient: Principal,
        amount: Amount,
    },
}

/// An event with its position in the log and the time it was committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: u64,
    pub at: Timestamp,
    pub event: ElectionEvent,
}

/// Append-only log of committed events. Sequence numbers start at 1.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from saved records, which must carry strictly
    /// increasing sequence numbers starting above 0.
    pub(crate) fn from_records(records: Vec<EventRecord>) -> Result<Self, ElectionError> {
        let mut prev = 0;
        for record in &records {
            if record.seq <= prev {
                return Err(ElectionError::Snapshot(format!(
                    "event seq {} follows {prev}",
                    record.seq
                )));
            }
            prev = record.seq;
        }
        Ok(Self { records })
    }

    pub(crate) fn append(&mut self, at: Timestamp, event: ElectionEvent) -> &EventRecord {
        let seq = self.last_seq() + 1;
        self.records.push(EventRecord { seq, at, event });
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with a sequence number greater than `seq`.
    pub fn since(&self, seq: u64) -> &[EventRecord] {
        let start = self.records.partition_point(|r| r.seq <= seq);
        &self.records[start..]
    }

    pub fn last_seq(&self) -> u64 {
        self.records.last().map(|r| r.seq).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Synchronous fan-out of committed events.
///
/// Listeners are invoked inline after each commit; keep handlers fast.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&EventRecord) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&EventRecord) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, record: &EventRecord) {
        for listener in &self.listeners {
            listener(record);
        }
    }
}
