//! The voting-period window.

use elect_types::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Half-open window `[start, end)` during which votes are accepted.
///
/// `start < end` holds for every value of this type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod", into = "RawPeriod")]
pub struct VotingPeriod {
    start: Timestamp,
    end: Timestamp,
}

impl VotingPeriod {
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, RegistryError> {
        if start >= end {
            return Err(RegistryError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn has_started(&self, now: Timestamp) -> bool {
        now >= self.start
    }

    pub fn has_ended(&self, now: Timestamp) -> bool {
        now >= self.end
    }

    /// Whether `now` falls inside `[start, end)`.
    pub fn contains(&self, now: Timestamp) -> bool {
        self.has_started(now) && !self.has_ended(now)
    }

    pub fn duration_secs(&self) -> u64 {
        self.start.elapsed_since(self.end)
    }
}

#[derive(Serialize, Deserialize)]
struct RawPeriod {
    start: Timestamp,
    end: Timestamp,
}

impl TryFrom<RawPeriod> for VotingPeriod {
    type Error = RegistryError;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl From<VotingPeriod> for RawPeriod {
    fn from(p: VotingPeriod) -> Self {
        Self {
            start: p.start,
            end: p.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(start: u64, end: u64) -> VotingPeriod {
        VotingPeriod::new(Timestamp::new(start), Timestamp::new(end)).unwrap()
    }

    #[test]
    fn window_is_half_open() {
        let p = period(100, 200);
        assert!(!p.contains(Timestamp::new(99)));
        assert!(p.contains(Timestamp::new(100)));
        assert!(p.contains(Timestamp::new(199)));
        assert!(!p.contains(Timestamp::new(200)));
        assert!(p.has_ended(Timestamp::new(200)));
        assert_eq!(p.duration_secs(), 100);
    }

    #[test]
    fn start_must_precede_end() {
        assert!(matches!(
            VotingPeriod::new(Timestamp::new(5), Timestamp::new(5)),
            Err(RegistryError::InvalidPeriod { .. })
        ));
        assert!(VotingPeriod::new(Timestamp::new(6), Timestamp::new(5)).is_err());
    }
}
