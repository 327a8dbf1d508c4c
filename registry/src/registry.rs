//! The candidate registry component.

use std::collections::BTreeMap;

use elect_types::{Principal, Timestamp};
use serde::{Deserialize, Serialize};

use crate::candidate::{Candidate, CandidateDetails, CandidateId};
use crate::error::RegistryError;
use crate::period::VotingPeriod;

/// Candidate lifecycle and the voting-period window, guarded by a single owner.
///
/// Candidates are stored in a map keyed by their sequential id, so iteration
/// order equals assignment order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateRegistry {
    owner: Principal,
    period: VotingPeriod,
    candidates: BTreeMap<CandidateId, Candidate>,
    next_id: CandidateId,
}

impl CandidateRegistry {
    pub fn new(owner: Principal, period: VotingPeriod) -> Self {
        Self {
            owner,
            period,
            candidates: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Create a registry seeded with one candidate (id 1) registered by the owner.
    pub fn with_initial_candidate(
        owner: Principal,
        period: VotingPeriod,
        name: impl Into<String>,
        address: Principal,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new(owner.clone(), period);
        registry.add_candidate(&owner, name, address)?;
        Ok(registry)
    }

    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    pub fn voting_period(&self) -> VotingPeriod {
        self.period
    }

    fn ensure_owner(&self, caller: &Principal) -> Result<(), RegistryError> {
        if caller != &self.owner {
            tracing::warn!(%caller, "registry call rejected: not owner");
            return Err(RegistryError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    // ── Owner-only mutations ────────────────────────────────────────────

    /// Register a new candidate and return its id.
    ///
    /// The same address may stand as several candidates.
    pub fn add_candidate(
        &mut self,
        caller: &Principal,
        name: impl Into<String>,
        address: Principal,
    ) -> Result<CandidateId, RegistryError> {
        self.ensure_owner(caller)?;
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let id = self.next_id;
        let next_id = id.checked_add(1).ok_or(RegistryError::Overflow)?;
        tracing::info!(id, %name, %address, "candidate added");
        self.candidates.insert(id, Candidate::new(id, name, address));
        self.next_id = next_id;
        Ok(id)
    }

    /// Deactivate a candidate.
    ///
    /// Deactivating an already-inactive candidate succeeds without effect; the
    /// returned flag tells whether the candidate changed state.
    pub fn deactivate_candidate(
        &mut self,
        caller: &Principal,
        id: CandidateId,
    ) -> Result<bool, RegistryError> {
        self.ensure_owner(caller)?;
        let candidate = self
            .candidates
            .get_mut(&id)
            .ok_or(RegistryError::CandidateNotFound(id))?;
        if !candidate.active {
            tracing::debug!(id, "candidate already inactive");
            return Ok(false);
        }
        candidate.active = false;
        tracing::info!(id, "candidate deactivated");
        Ok(true)
    }

    /// Overwrite the voting period.
    pub fn update_voting_period(
        &mut self,
        caller: &Principal,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<VotingPeriod, RegistryError> {
        self.ensure_owner(caller)?;
        let period = VotingPeriod::new(start, end)?;
        tracing::info!(%start, %end, "voting period updated");
        self.period = period;
        Ok(period)
    }

    // ── Tally hooks (controller only) ───────────────────────────────────

    /// Fail unless `id` names an active candidate.
    pub fn check_votable(&self, id: CandidateId) -> Result<&Candidate, RegistryError> {
        let candidate = self
            .candidates
            .get(&id)
            .ok_or(RegistryError::CandidateNotFound(id))?;
        if !candidate.active {
            return Err(RegistryError::CandidateInactive(id));
        }
        Ok(candidate)
    }

    /// Add one vote to an active candidate's tally.
    pub fn record_vote(&mut self, id: CandidateId) -> Result<u64, RegistryError> {
        self.check_votable(id)?;
        let candidate = self
            .candidates
            .get_mut(&id)
            .ok_or(RegistryError::CandidateNotFound(id))?;
        candidate.total_votes = candidate
            .total_votes
            .checked_add(1)
            .ok_or(RegistryError::Overflow)?;
        Ok(candidate.total_votes)
    }

    /// Remove one vote previously added by [`record_vote`](Self::record_vote).
    ///
    /// Used to roll back an aborted transaction, so it ignores the active flag.
    pub fn revert_vote(&mut self, id: CandidateId) -> Result<u64, RegistryError> {
        let candidate = self
            .candidates
            .get_mut(&id)
            .ok_or(RegistryError::CandidateNotFound(id))?;
        candidate.total_votes = candidate
            .total_votes
            .checked_sub(1)
            .ok_or(RegistryError::Overflow)?;
        Ok(candidate.total_votes)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    /// Every candidate id, inactive included, in assignment order.
    pub fn all_candidates(&self) -> Vec<CandidateId> {
        self.candidates.keys().copied().collect()
    }

    pub fn candidate_details(&self, id: CandidateId) -> Result<CandidateDetails, RegistryError> {
        self.candidates
            .get(&id)
            .map(Candidate::details)
            .ok_or(RegistryError::CandidateNotFound(id))
    }

    /// Active candidates in ascending id order.
    pub fn active_candidates(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.values().filter(|c| c.active)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Sum of every candidate's tally, inactive included.
    pub fn total_votes(&self) -> u64 {
        self.candidates.values().map(|c| c.total_votes).sum()
    }

    /// Check the structural invariants of restored state.
    pub fn check_integrity(&self) -> Result<(), RegistryError> {
        if self.next_id == 0 {
            return Err(RegistryError::Corrupt("next id is 0; ids start at 1".into()));
        }
        for (key, candidate) in &self.candidates {
            if *key != candidate.id || candidate.id == 0 {
                return Err(RegistryError::Corrupt(format!(
                    "candidate stored under {key} carries id {}",
                    candidate.id
                )));
            }
        }
        match self.candidates.keys().next_back() {
            Some(max) if *max >= self.next_id => Err(RegistryError::Corrupt(format!(
                "next id {} does not follow highest id {max}",
                self.next_id
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(name: &str) -> Principal {
        Principal::new(name).unwrap()
    }

    fn period(start: u64, end: u64) -> VotingPeriod {
        VotingPeriod::new(Timestamp::new(start), Timestamp::new(end)).unwrap()
    }

    fn registry() -> CandidateRegistry {
        CandidateRegistry::new(principal("owner"), period(100, 200))
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let mut reg = registry();
        let owner = principal("owner");
        let a = reg.add_candidate(&owner, "Ana", principal("0xa")).unwrap();
        let b = reg.add_candidate(&owner, "Bogdan", principal("0xb")).unwrap();
        let c = reg.add_candidate(&owner, "Ana again", principal("0xa")).unwrap();
        assert_eq!((a, b, c), (1, 2, 3));
        assert_eq!(reg.all_candidates(), vec![1, 2, 3]);
    }

    #[test]
    fn initial_candidate_takes_id_one() {
        let reg = CandidateRegistry::with_initial_candidate(
            principal("owner"),
            period(100, 200),
            "Initial Candidate",
            principal("owner"),
        )
        .unwrap();
        let details = reg.candidate_details(1).unwrap();
        assert_eq!(details.name, "Initial Candidate");
        assert_eq!(details.total_votes, 0);
        assert!(details.active);
    }

    #[test]
    fn non_owner_cannot_mutate() {
        let mut reg = registry();
        let mallory = principal("mallory");
        assert!(matches!(
            reg.add_candidate(&mallory, "X", principal("0xx")),
            Err(RegistryError::Unauthorized { .. })
        ));
        assert!(matches!(
            reg.update_voting_period(&mallory, Timestamp::new(1), Timestamp::new(2)),
            Err(RegistryError::Unauthorized { .. })
        ));
        assert_eq!(reg.voting_period(), period(100, 200));
        assert!(reg.is_empty());
    }

    #[test]
    fn non_owner_cannot_deactivate() {
        let mut reg = registry();
        let owner = principal("owner");
        let id = reg.add_candidate(&owner, "Ana", principal("0xa")).unwrap();
        let err = reg.deactivate_candidate(&principal("mallory"), id).unwrap_err();
        assert_eq!(err.kind(), elect_types::ErrorKind::Unauthorized);
        assert!(reg.candidate_details(id).unwrap().active);
        assert_eq!(reg.active_candidates().count(), 1);
    }

    #[test]
    fn empty_name_rejected_without_consuming_id() {
        let mut reg = registry();
        let owner = principal("owner");
        assert_eq!(
            reg.add_candidate(&owner, "  ", principal("0xa")),
            Err(RegistryError::EmptyName)
        );
        assert_eq!(reg.add_candidate(&owner, "Ana", principal("0xa")).unwrap(), 1);
    }

    #[test]
    fn deactivate_is_idempotent_and_blocks_votes() {
        let mut reg = registry();
        let owner = principal("owner");
        let id = reg.add_candidate(&owner, "Ana", principal("0xa")).unwrap();
        assert!(reg.deactivate_candidate(&owner, id).unwrap());
        assert!(!reg.deactivate_candidate(&owner, id).unwrap());
        assert_eq!(reg.record_vote(id), Err(RegistryError::CandidateInactive(id)));
        assert_eq!(
            reg.deactivate_candidate(&owner, 42),
            Err(RegistryError::CandidateNotFound(42))
        );
        // Inactive candidates stay listed.
        assert_eq!(reg.all_candidates(), vec![id]);
        assert_eq!(reg.active_candidates().count(), 0);
    }

    #[test]
    fn invalid_period_leaves_state_unchanged() {
        let mut reg = registry();
        let owner = principal("owner");
        assert!(matches!(
            reg.update_voting_period(&owner, Timestamp::new(300), Timestamp::new(300)),
            Err(RegistryError::InvalidPeriod { .. })
        ));
        assert_eq!(reg.voting_period(), period(100, 200));
        reg.update_voting_period(&owner, Timestamp::new(300), Timestamp::new(400))
            .unwrap();
        assert_eq!(reg.voting_period(), period(300, 400));
    }

    #[test]
    fn record_and_revert_vote() {
        let mut reg = registry();
        let owner = principal("owner");
        let id = reg.add_candidate(&owner, "Ana", principal("0xa")).unwrap();
        assert_eq!(reg.record_vote(id).unwrap(), 1);
        assert_eq!(reg.record_vote(id).unwrap(), 2);
        assert_eq!(reg.revert_vote(id).unwrap(), 1);
        assert_eq!(reg.total_votes(), 1);
        assert_eq!(reg.record_vote(9), Err(RegistryError::CandidateNotFound(9)));
    }

    #[test]
    fn details_tuple_order() {
        let mut reg = registry();
        let owner = principal("owner");
        let id = reg.add_candidate(&owner, "Ana", principal("0xa")).unwrap();
        let (tid, addr, name, votes, active) = reg.candidate_details(id).unwrap().into_tuple();
        assert_eq!(tid, 1);
        assert_eq!(addr, principal("0xa"));
        assert_eq!(name, "Ana");
        assert_eq!(votes, 0);
        assert!(active);
    }

    #[test]
    fn integrity_check_accepts_fresh_registry() {
        let mut reg = registry();
        let owner = principal("owner");
        reg.add_candidate(&owner, "Ana", principal("0xa")).unwrap();
        assert!(reg.check_integrity().is_ok());
    }

    #[test]
    fn integrity_check_rejects_zero_next_id() {
        let mut reg = registry();
        reg.next_id = 0;
        assert!(matches!(reg.check_integrity(), Err(RegistryError::Corrupt(_))));
    }
}
