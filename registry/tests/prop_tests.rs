use proptest::prelude::*;

use elect_registry::{CandidateRegistry, RegistryError, VotingPeriod};
use elect_types::{Principal, Timestamp};

fn owner() -> Principal {
    Principal::new("owner").unwrap()
}

fn fresh_registry() -> CandidateRegistry {
    let period = VotingPeriod::new(Timestamp::new(100), Timestamp::new(200)).unwrap();
    CandidateRegistry::new(owner(), period)
}

proptest! {
    /// Ids are unique and strictly increasing across any mix of successful
    /// and rejected `add_candidate` calls.
    #[test]
    fn candidate_ids_strictly_increase(
        calls in prop::collection::vec((any::<bool>(), "[a-z ]{0,8}"), 1..60),
    ) {
        let mut reg = fresh_registry();
        let mallory = Principal::new("mallory").unwrap();
        let mut last = 0u64;
        for (as_owner, name) in calls {
            let caller = if as_owner { owner() } else { mallory.clone() };
            match reg.add_candidate(&caller, name, Principal::new("0xaddr").unwrap()) {
                Ok(id) => {
                    prop_assert!(id > last, "id {} not above {}", id, last);
                    prop_assert_eq!(id, last + 1);
                    last = id;
                }
                Err(RegistryError::Unauthorized { .. }) => prop_assert!(!as_owner),
                Err(RegistryError::EmptyName) => {}
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }
        let ids = reg.all_candidates();
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    /// A period update either succeeds with start < end or leaves the period untouched.
    #[test]
    fn period_updates_keep_start_before_end(start in 0u64..1_000, end in 0u64..1_000) {
        let mut reg = fresh_registry();
        let before = reg.voting_period();
        let result = reg.update_voting_period(&owner(), Timestamp::new(start), Timestamp::new(end));
        if start < end {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(
                matches!(result, Err(RegistryError::InvalidPeriod { .. })),
                "expected InvalidPeriod for start {} end {}", start, end
            );
            prop_assert_eq!(reg.voting_period(), before);
        }
        let p = reg.voting_period();
        prop_assert!(p.start() < p.end());
    }
}
