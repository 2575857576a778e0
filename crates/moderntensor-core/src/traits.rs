// crates/moderntensor-core/src/traits.rs

use crate::error::LedgerError;
use crate::identity::Address;

/// The underlying ledger's native balance-keeping primitive.
///
/// The registry never keeps balances itself; it consumes this atomic
/// "debit one account, credit another" capability.
///
/// Implemented by moderntensor-economics (in-memory ledger).
pub trait Ledger: Send + Sync {
    /// Current balance of `address`. Unknown accounts hold zero.
    fn balance(&self, address: &Address) -> u64;

    /// Move `amount` from `from` to `to`. Either both sides change or neither.
    fn transfer(&mut self, from: &Address, to: &Address, amount: u64) -> Result<(), LedgerError>;
}

/// Source of the current unix time in seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}
