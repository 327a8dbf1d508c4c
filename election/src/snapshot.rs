//! Export and import of the full election state.

use std::collections::BTreeMap;

use elect_fees::FeeLedger;
use elect_registry::CandidateRegistry;
use elect_types::Principal;
use serde::{Deserialize, Serialize};

use crate::error::ElectionError;
use crate::event::EventRecord;
use crate::voter::VoterRecord;

/// Bumped whenever the encoded layout changes.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to rebuild an [`ElectionController`](crate::ElectionController),
/// except the clock and the payout sink.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElectionSnapshot {
    pub version: u32,
    pub registry: CandidateRegistry,
    pub ledger: FeeLedger,
    pub voters: BTreeMap<Principal, VoterRecord>,
    pub events: Vec<EventRecord>,
}

impl ElectionSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, ElectionError> {
        bincode::serialize(self).map_err(|e| ElectionError::Snapshot(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ElectionError> {
        let snapshot: Self =
            bincode::deserialize(bytes).map_err(|e| ElectionError::Snapshot(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(ElectionError::Snapshot(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }

    /// Write to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), ElectionError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| ElectionError::Snapshot(format!("{}: {e}", path.as_ref().display())))
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ElectionError> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| ElectionError::Snapshot(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_bytes(&bytes)
    }
}
