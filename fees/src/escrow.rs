//! Funds held pending release to the winner.

use elect_types::Amount;
use serde::{Deserialize, Serialize};

/// Escrowed payments.
///
/// `released` is a one-way latch; once set the balance stays zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escrow {
    pub balance: Amount,
    pub released: bool,
}
