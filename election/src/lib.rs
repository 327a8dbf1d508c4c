//! Election controller.
//!
//! Coordinates a time-boxed election over two leaf components:
//! - the [`CandidateRegistry`], which owns candidates and the voting period
//! - the [`FeeLedger`], which owns vote pricing, paid-vote quotas and escrow
//!
//! The controller owns voter registration and free-vote counters, and runs
//! every operation as one atomic transaction: sub-steps applied to either
//! component are journaled and undone if a later step fails, and events are
//! only published once the transaction commits.
//!
//! Lifecycle: `NotStarted → Open → Closed → Finalized`, recomputed on every
//! call from the clock and the escrow latch.

pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod phase;
pub mod snapshot;
mod txn;
pub mod voter;
pub mod winner;

pub use config::{ElectionConfig, InitialCandidate};
pub use controller::{ElectionController, VoteReceipt};
pub use error::ElectionError;
pub use event::{ElectionEvent, EventBus, EventLog, EventRecord, VoteKind};
pub use phase::ElectionPhase;
pub use snapshot::ElectionSnapshot;
pub use voter::{Voter, VoterRecord};
pub use winner::Winner;

pub use elect_fees::{AccountBook, Escrow, FeeConfig, FeeLedger, PayoutSink};
pub use elect_registry::{CandidateDetails, CandidateId, CandidateRegistry, VotingPeriod};
