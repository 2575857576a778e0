// crates/moderntensor-daemon/src/snapshot.rs
//
// On-disk JSON snapshot of the registry state and the ledger balances of
// every account the daemon knows about.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use moderntensor_core::Address;
use moderntensor_registry::{Network, NetworkState};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Unix seconds at which the snapshot was taken.
    pub taken_at: u64,
    pub state: NetworkState,
    pub balances: BTreeMap<Address, u64>,
}

impl Snapshot {
    /// Capture `network` together with the balances of `accounts`.
    pub fn capture<'a>(network: &Network, accounts: impl IntoIterator<Item = &'a Address>) -> Self {
        let ledger = network.ledger();
        let balances = accounts
            .into_iter()
            .map(|address| (*address, ledger.balance(address)))
            .collect();
        Self {
            taken_at: network.now(),
            state: network.state().clone(),
            balances,
        }
    }

    /// Read a snapshot, or `None` if no file exists yet.
    pub fn load(path: &Path) -> Result<Option<Self>, SnapshotError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Write the snapshot, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Every account the registry state refers to.
pub fn known_accounts(state: &NetworkState) -> Vec<Address> {
    let registry = &state.registry;
    std::iter::once(state.admin)
        .chain(registry.validators.addresses().iter().copied())
        .chain(registry.miners.addresses().iter().copied())
        .collect()
}
