use std::sync::Arc;

use proptest::prelude::*;

use elect_election::{ElectionConfig, ElectionController, ElectionPhase};
use elect_nullables::{NullClock, NullPayout};
use elect_types::{Amount, ErrorKind, Principal, Timestamp};

const VOTERS: [&str; 3] = ["v0", "v1", "v2"];

#[derive(Clone, Debug)]
enum Op {
    Register(usize),
    Vote { voter: usize, candidate: u64, payment: u128 },
    Deactivate(u64),
    SetFee(u128),
    SetMaxPaid(u32),
    MovePeriod { start: u64, end: u64 },
    Tick(u64),
    Release,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => (0..VOTERS.len()).prop_map(Op::Register),
        4 => (0..VOTERS.len(), 0u64..5, prop_oneof![Just(0u128), 0u128..40])
            .prop_map(|(voter, candidate, payment)| Op::Vote { voter, candidate, payment }),
        1 => (1u64..5).prop_map(Op::Deactivate),
        1 => (0u128..20).prop_map(Op::SetFee),
        1 => (0u32..4).prop_map(Op::SetMaxPaid),
        1 => (0u64..400, 0u64..400).prop_map(|(start, end)| Op::MovePeriod { start, end }),
        1 => (0u64..60).prop_map(Op::Tick),
        1 => Just(Op::Release),
    ]
}

fn principal(name: &str) -> Principal {
    Principal::new(name).unwrap()
}

/// Period `[100, 300)`, clock at 100, fee 10 raw, 2 free votes, 3 paid votes,
/// four candidates.
fn setup() -> (ElectionController, NullClock) {
    let owner = principal("owner");
    let clock = NullClock::new(100);
    let mut config = ElectionConfig::new(owner.clone());
    config.voting_start = 100;
    config.voting_end = Some(300);
    config.fee = "0.00000000000000001".into();
    config.free_vote_limit = 2;
    config.max_paid_votes = 3;
    let mut election =
        ElectionController::from_config(&config, Arc::new(clock.clone()), Box::new(NullPayout::new()))
            .unwrap();
    for name in ["a", "b", "c", "d"] {
        election.add_candidate(&owner, name, principal(name)).unwrap();
    }
    (election, clock)
}

proptest! {
    /// After any sequence of calls the tallies match the votes cast, no voter
    /// exceeds the free-vote limit, and a released escrow stays empty.
    #[test]
    fn invariants_hold_after_any_sequence(ops in prop::collection::vec(op(), 1..80)) {
        let (mut election, clock) = setup();
        let owner = principal("owner");
        let mut released = false;

        for op in ops {
            match op {
                Op::Register(i) => {
                    let _ = election.register_voter(&principal(VOTERS[i]));
                }
                Op::Vote { voter, candidate, payment } => {
                    let before = election.snapshot();
                    if election.vote(&principal(VOTERS[voter]), candidate, Amount::new(payment)).is_err() {
                        let after = election.snapshot();
                        prop_assert_eq!(before.voters, after.voters);
                        prop_assert_eq!(before.events.len(), after.events.len());
                        prop_assert_eq!(before.ledger.escrow(), after.ledger.escrow());
                        prop_assert_eq!(before.registry.total_votes(), after.registry.total_votes());
                    }
                }
                Op::Deactivate(id) => {
                    let _ = election.deactivate_candidate(&owner, id);
                }
                Op::SetFee(fee) => {
                    election.update_fees(&owner, Amount::new(fee)).unwrap();
                }
                Op::SetMaxPaid(max) => {
                    election.update_max_paid_votes(&owner, max).unwrap();
                }
                Op::MovePeriod { start, end } => {
                    let _ = election.update_voting_period(&owner, Timestamp::new(start), Timestamp::new(end));
                }
                Op::Tick(secs) => clock.advance(secs),
                Op::Release => {
                    let result = election.release_funds(&owner, &principal("treasury"));
                    if released {
                        prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::AlreadyReleased);
                    } else {
                        prop_assert!(result.is_ok());
                        released = true;
                        prop_assert!(election.escrow().balance.is_zero());
                    }
                }
            }

            prop_assert!(election.check_invariants().is_ok());
            let limit = election.fee_config().free_vote_limit;
            for voter in election.voters() {
                prop_assert!(voter.free_votes_used <= limit);
            }
            prop_assert_eq!(election.escrow().released, released);
        }

        let tallied: u64 = election
            .candidates()
            .into_iter()
            .map(|id| election.candidate_details(id).unwrap().total_votes)
            .sum();
        let cast: u64 = election.voters().iter().map(|v| v.votes_cast()).sum();
        prop_assert_eq!(tallied, cast);
    }

    /// With a fixed ceiling a voter never holds more paid votes than it allows.
    #[test]
    fn paid_votes_bounded_by_ceiling(payments in prop::collection::vec(0u128..30, 1..30)) {
        let (mut election, _clock) = setup();
        let voter = principal("v0");
        election.register_voter(&voter).unwrap();
        for payment in payments {
            let _ = election.vote(&voter, 1, Amount::new(payment));
            prop_assert!(election.total_paid_votes(&voter) <= election.fee_config().max_paid_votes);
        }
    }

    /// A vote outside `[start, end)` fails with InvalidPeriod whatever the
    /// voter's registration or payment.
    #[test]
    fn vote_outside_window_is_invalid_period(
        now in prop_oneof![0u64..100, 300u64..10_000],
        registered in any::<bool>(),
        candidate in 0u64..6,
        payment in 0u128..100,
    ) {
        let (mut election, clock) = setup();
        let voter = principal("v0");
        if registered {
            election.register_voter(&voter).unwrap();
        }
        clock.set(now);
        prop_assert!(matches!(
            election.phase(),
            ElectionPhase::NotStarted | ElectionPhase::Closed
        ));
        let err = election.vote(&voter, candidate, Amount::new(payment)).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::InvalidPeriod);
        prop_assert_eq!(election.voter(&voter).votes_cast(), 0);
    }
}
