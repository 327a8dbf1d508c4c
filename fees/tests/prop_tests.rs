use proptest::prelude::*;

use elect_fees::{AccountBook, FeeConfig, FeeError, FeeLedger};
use elect_types::{Amount, Principal};

fn voter(n: u8) -> Principal {
    Principal::new(format!("voter_{n}")).unwrap()
}

proptest! {
    /// Paid-vote counters never exceed the ceiling, and the escrow equals the
    /// sum of every accepted payment.
    #[test]
    fn escrow_matches_accepted_payments(
        fee in 1u128..1_000,
        max_paid in 0u32..6,
        payments in prop::collection::vec((0u8..4, 0u128..2_000), 0..80),
    ) {
        let owner = Principal::new("owner").unwrap();
        let mut ledger = FeeLedger::new(owner, FeeConfig::new(Amount::new(fee), 0, max_paid));
        let mut accepted = 0u128;
        for (who, paid) in payments {
            match ledger.pay_to_vote(&voter(who), Amount::new(paid)) {
                Ok(receipt) => {
                    prop_assert!(paid >= fee);
                    prop_assert!(receipt.paid_votes_used <= max_paid);
                    accepted += paid;
                }
                Err(FeeError::InsufficientPayment { .. }) => prop_assert!(paid < fee),
                Err(FeeError::VoteQuotaExceeded { .. }) => {
                    prop_assert_eq!(ledger.total_paid_votes(&voter(who)), max_paid);
                }
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }
        for n in 0..4 {
            prop_assert!(ledger.total_paid_votes(&voter(n)) <= max_paid);
        }
        prop_assert_eq!(ledger.escrow().balance, Amount::new(accepted));
    }

    /// Only the first release succeeds and it empties the escrow.
    #[test]
    fn release_is_single_shot(attempts in 1usize..5, deposit in 0u128..10_000) {
        let owner = Principal::new("owner").unwrap();
        let winner = Principal::new("winner").unwrap();
        let mut ledger = FeeLedger::new(owner.clone(), FeeConfig::new(Amount::ZERO, 0, 1));
        ledger.pay_to_vote(&voter(0), Amount::new(deposit)).unwrap();
        let mut book = AccountBook::new();
        for i in 0..attempts {
            let result = ledger.release_funds(&owner, &winner, &mut book);
            if i == 0 {
                prop_assert_eq!(result, Ok(Amount::new(deposit)));
            } else {
                prop_assert_eq!(result, Err(FeeError::AlreadyReleased));
            }
            prop_assert!(ledger.escrow().released);
            prop_assert_eq!(ledger.escrow().balance, Amount::ZERO);
        }
        prop_assert_eq!(book.balance_of(&winner), Amount::new(deposit));
    }
}
