// crates/moderntensor-economics/src/ledger.rs
//
// In-memory implementation of the ledger transfer capability, used by the
// daemon's local replay mode and by tests. Balances are seeded from genesis.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use moderntensor_core::{Address, Ledger, LedgerError};

/// Account balances held in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryLedger {
    balances: HashMap<Address, u64>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger seeded with the given balances.
    pub fn with_balances(balances: impl IntoIterator<Item = (Address, u64)>) -> Self {
        let mut ledger = Self::new();
        for (address, amount) in balances {
            ledger.mint(&address, amount);
        }
        ledger
    }

    /// Create funds out of thin air (genesis and test fixtures only).
    pub fn mint(&mut self, address: &Address, amount: u64) {
        let balance = self.balances.entry(*address).or_insert(0);
        *balance = balance.saturating_add(amount);
    }
}

impl Ledger for InMemoryLedger {
    fn balance(&self, address: &Address) -> u64 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u64) -> Result<(), LedgerError> {
        let available = self.balance(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                address: *from,
                required: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance(to)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(*to))?;

        self.balances.insert(*from, available - amount);
        self.balances.insert(*to, credited);
        Ok(())
    }
}
