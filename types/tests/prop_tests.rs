use proptest::prelude::*;

use elect_types::amount::UNIT;
use elect_types::{Amount, Principal, Timestamp};

proptest! {
    /// `elapsed_since` and `remaining_from` are mirror images and saturate at zero.
    #[test]
    fn elapsed_and_remaining_mirror(a in 0u64..1_000_000, b in 0u64..1_000_000) {
        let (ta, tb) = (Timestamp::new(a), Timestamp::new(b));
        prop_assert_eq!(ta.elapsed_since(tb), tb.remaining_from(ta));
        prop_assert_eq!(ta.elapsed_since(tb), b.saturating_sub(a));
        prop_assert_eq!(ta <= tb, a <= b);
    }

    /// Formatting then parsing whole-unit amounts is lossless.
    #[test]
    fn units_format_parse(whole in 0u64..1_000_000_000, frac in 0u128..UNIT) {
        let amount = Amount::units(whole).checked_add(Amount::new(frac)).unwrap();
        let text = amount.format_units();
        prop_assert_eq!(Amount::parse_units(&text).unwrap(), amount);
        prop_assert!(!text.ends_with('.'));
    }

    /// Inputs with letters or more than one decimal point never parse.
    #[test]
    fn malformed_amounts_rejected(a in "[0-9]{0,5}", b in "[0-9]{0,5}", junk in "[a-z.]{1,3}") {
        let input = format!("{a}.{b}{junk}");
        prop_assert!(Amount::parse_units(&input).is_err());
    }

    /// Checked subtraction undoes checked addition.
    #[test]
    fn checked_add_then_sub(a in 0u128..u128::MAX / 2, b in 0u128..u128::MAX / 2) {
        let (a, b) = (Amount::new(a), Amount::new(b));
        let sum = a.checked_add(b).unwrap();
        prop_assert_eq!(sum.checked_sub(b), Some(a));
        prop_assert_eq!(b.saturating_sub(sum), Amount::ZERO);
    }

    /// Principals are trimmed, blank ones are rejected, and both survive bincode.
    #[test]
    fn principal_trim_and_encode(raw in "[a-zA-Z0-9_]{1,64}", pad in " {0,3}") {
        let p = Principal::new(format!("{pad}{raw}{pad}")).unwrap();
        prop_assert_eq!(p.as_str(), raw.as_str());
        let decoded: Principal = bincode::deserialize(&bincode::serialize(&p).unwrap()).unwrap();
        prop_assert_eq!(decoded, p);
        prop_assert!(Principal::new(pad).is_err());
    }
}
