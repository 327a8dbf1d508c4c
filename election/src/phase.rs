//! Election lifecycle phases.

use elect_registry::VotingPeriod;
use elect_types::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the election stands. Never stored; always derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElectionPhase {
    /// Before the voting period starts.
    NotStarted,
    /// Inside `[start, end)`: votes are accepted.
    Open,
    /// At or after `end`: tallies are final, escrow still held.
    Closed,
    /// Escrow has been released. Terminal.
    Finalized,
}

impl ElectionPhase {
    /// Derive the phase from the period, the escrow latch and the current time.
    ///
    /// A released escrow wins over the clock.
    pub fn at(period: &VotingPeriod, released: bool, now: Timestamp) -> Self {
        if released {
            Self::Finalized
        } else if !period.has_started(now) {
            Self::NotStarted
        } else if !period.has_ended(now) {
            Self::Open
        } else {
            Self::Closed
        }
    }

    pub fn accepts_votes(&self) -> bool {
        matches!(self, Self::Open)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for ElectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_follows_clock_then_latch() {
        let period = VotingPeriod::new(Timestamp::new(10), Timestamp::new(20)).unwrap();
        let at = |t| ElectionPhase::at(&period, false, Timestamp::new(t));
        assert_eq!(at(9), ElectionPhase::NotStarted);
        assert_eq!(at(10), ElectionPhase::Open);
        assert_eq!(at(19), ElectionPhase::Open);
        assert_eq!(at(20), ElectionPhase::Closed);
        assert_eq!(
            ElectionPhase::at(&period, true, Timestamp::new(15)),
            ElectionPhase::Finalized
        );
        assert!(at(15).accepts_votes());
        assert!(!at(25).accepts_votes());
    }
}
