//! Scripted call replay.
//!
//! A script is a TOML file of `[[step]]` tables. Each step names a call, the
//! caller, and optionally the time at which it happens:
//!
//! ```toml
//! [[step]]
//! at = 1_700_000_100
//! caller = "alice"
//! call = "vote"
//! candidate = 1
//! payment = "0.5"
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{bail, Context};
use elect_election::{ElectionController, ElectionError};
use elect_types::{Amount, Clock, Principal, Timestamp};
use serde::Deserialize;
use serde_json::{json, Value};

/// Clock driven by the script's `at` fields.
#[derive(Debug, Default)]
pub struct ReplayClock {
    now: AtomicU64,
}

impl ReplayClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn set(&self, secs: u64) {
        self.now.store(secs, Ordering::SeqCst);
    }
}

impl Clock for ReplayClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.now.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
pub struct Step {
    /// Unix seconds; the clock keeps its previous value when absent.
    #[serde(default)]
    pub at: Option<u64>,
    #[serde(default)]
    pub caller: Option<Principal>,
    #[serde(flatten)]
    pub call: Call,
}

/// Amounts are decimal strings of whole units.
#[derive(Debug, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum Call {
    RegisterVoter,
    Vote {
        candidate: u64,
        #[serde(default)]
        payment: Option<String>,
    },
    AddCandidate {
        name: String,
        address: Principal,
    },
    DeactivateCandidate {
        candidate: u64,
    },
    UpdateVotingPeriod {
        start: u64,
        end: u64,
    },
    UpdateFees {
        fee: String,
    },
    UpdateMaxPaidVotes {
        max: u32,
    },
    ReleaseFunds {
        recipient: Principal,
    },
    Finalize,
    Winner,
    Phase,
    AllCandidates,
    CandidateDetails {
        candidate: u64,
    },
    TotalPaidVotes {
        voter: Principal,
    },
    Voter {
        voter: Principal,
    },
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterVoter => "register_voter",
            Self::Vote { .. } => "vote",
            Self::AddCandidate { .. } => "add_candidate",
            Self::DeactivateCandidate { .. } => "deactivate_candidate",
            Self::UpdateVotingPeriod { .. } => "update_voting_period",
            Self::UpdateFees { .. } => "update_fees",
            Self::UpdateMaxPaidVotes { .. } => "update_max_paid_votes",
            Self::ReleaseFunds { .. } => "release_funds",
            Self::Finalize => "finalize",
            Self::Winner => "winner",
            Self::Phase => "phase",
            Self::AllCandidates => "all_candidates",
            Self::CandidateDetails { .. } => "candidate_details",
            Self::TotalPaidVotes { .. } => "total_paid_votes",
            Self::Voter { .. } => "voter",
        }
    }

    fn needs_caller(&self) -> bool {
        !matches!(
            self,
            Self::Winner
                | Self::Phase
                | Self::AllCandidates
                | Self::CandidateDetails { .. }
                | Self::TotalPaidVotes { .. }
                | Self::Voter { .. }
        )
    }
}

impl Script {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing script {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

/// Outcome of one replayed step.
#[derive(Debug)]
pub struct StepOutcome {
    pub index: usize,
    pub at: Timestamp,
    pub call: &'static str,
    pub result: Result<Value, ElectionError>,
}

impl StepOutcome {
    pub fn to_json(&self) -> Value {
        let mut line = json!({
            "step": self.index,
            "at": self.at.as_secs(),
            "call": self.call,
        });
        match &self.result {
            Ok(value) => line["ok"] = value.clone(),
            Err(e) => {
                line["error"] = json!({ "kind": e.kind().name(), "message": e.to_string() })
            }
        }
        line
    }
}

pub fn amount(s: &str) -> Result<Amount, ElectionError> {
    Amount::parse_units(s).map_err(|e| ElectionError::Config(e.to_string()))
}

/// Run every step in order. A failed call is recorded and replay continues,
/// unless `strict` is set.
pub fn replay(
    election: &mut ElectionController,
    clock: &ReplayClock,
    script: &Script,
    strict: bool,
) -> anyhow::Result<Vec<StepOutcome>> {
    let mut outcomes = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.iter().enumerate() {
        if let Some(at) = step.at {
            clock.set(at);
        }
        let result = match (&step.caller, step.call.needs_caller()) {
            (None, true) => bail!("step {index} ({}) has no caller", step.call.name()),
            (caller, _) => apply(election, caller.as_ref(), &step.call),
        };
        if let Err(e) = &result {
            tracing::debug!(step = index, call = step.call.name(), error = %e, "step failed");
            if strict {
                bail!("step {index} ({}) failed: {e}", step.call.name());
            }
        }
        outcomes.push(StepOutcome {
            index,
            at: clock.now(),
            call: step.call.name(),
            result,
        });
    }
    Ok(outcomes)
}

fn apply(
    election: &mut ElectionController,
    caller: Option<&Principal>,
    call: &Call,
) -> Result<Value, ElectionError> {
    // `needs_caller` has been checked; read-only calls ignore the caller.
    let who = || caller.ok_or_else(|| ElectionError::Config("missing caller".into()));
    let value = match call {
        Call::RegisterVoter => {
            election.register_voter(who()?)?;
            Value::Null
        }
        Call::Vote { candidate, payment } => {
            let payment = payment.as_deref().map(amount).transpose()?.unwrap_or_default();
            let receipt = election.vote(who()?, *candidate, payment)?;
            json!({
                "candidate": receipt.candidate,
                "candidate_votes": receipt.candidate_votes,
                "free_votes_used": receipt.free_votes_used,
                "paid_votes_used": receipt.paid_votes_used,
                "paid": matches!(receipt.kind, elect_election::VoteKind::Paid { .. }),
            })
        }
        Call::AddCandidate { name, address } => {
            json!(election.add_candidate(who()?, name.clone(), address.clone())?)
        }
        Call::DeactivateCandidate { candidate } => {
            json!({ "changed": election.deactivate_candidate(who()?, *candidate)? })
        }
        Call::UpdateVotingPeriod { start, end } => {
            let period = election.update_voting_period(
                who()?,
                Timestamp::new(*start),
                Timestamp::new(*end),
            )?;
            json!({ "start": period.start().as_secs(), "end": period.end().as_secs() })
        }
        Call::UpdateFees { fee } => {
            let previous = election.update_fees(who()?, amount(fee)?)?;
            json!({ "previous": previous.format_units() })
        }
        Call::UpdateMaxPaidVotes { max } => {
            json!({ "previous": election.update_max_paid_votes(who()?, *max)? })
        }
        Call::ReleaseFunds { recipient } => {
            json!({ "amount": election.release_funds(who()?, recipient)?.format_units() })
        }
        Call::Finalize => {
            let (winner, amount) = election.finalize(who()?)?;
            json!({
                "winner": winner.id,
                "address": winner.address,
                "votes": winner.total_votes,
                "amount": amount.format_units(),
            })
        }
        Call::Winner => {
            let (name, address, votes) = election.winner()?.into_tuple();
            json!({ "name": name, "address": address, "votes": votes })
        }
        Call::Phase => json!(election.phase().name()),
        Call::AllCandidates => json!(election.candidates()),
        Call::CandidateDetails { candidate } => {
            let (id, address, name, total_votes, active) =
                election.candidate_details(*candidate)?.into_tuple();
            json!({
                "id": id,
                "address": address,
                "name": name,
                "total_votes": total_votes,
                "active": active,
            })
        }
        Call::TotalPaidVotes { voter } => json!(election.total_paid_votes(voter)),
        Call::Voter { voter } => {
            let v = election.voter(voter);
            json!({
                "registered": v.registered,
                "free_votes_used": v.free_votes_used,
                "paid_votes_used": v.paid_votes_used,
            })
        }
    };
    Ok(value)
}
