// crates/moderntensor-registry/src/nodes.rs
//
// Keyed node stores and their membership indices.
//
// Each role has its own NodeStore: records keyed by address, a
// per-subnet membership index, and an ordered list of registered nodes.
// Every mutation keeps the three in step:
//   1. Every record appears in exactly one subnet index (its own subnet).
//   2. Every record appears exactly once in the node list.
//   3. No index entry outlives its record.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use moderntensor_core::{
    Address, MinerInfo, NodeCore, NodeRecord, NodeStatus, RegistryError, Role, SubnetId,
    ValidatorInfo,
};

use crate::weights::WeightEntry;

/// Records of one role plus their indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeStore<T> {
    records: HashMap<Address, T>,
    by_subnet: BTreeMap<SubnetId, Vec<Address>>,
    /// Registered nodes in registration order.
    nodes: Vec<Address>,
}

impl<T> Default for NodeStore<T> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            by_subnet: BTreeMap::new(),
            nodes: Vec::new(),
        }
    }
}

impl<T: NodeRecord> NodeStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.records.contains_key(address)
    }

    pub fn get(&self, address: &Address) -> Option<&T> {
        self.records.get(address)
    }

    /// Mutable access to a record. Callers must not change `subnet_id`.
    pub(crate) fn get_mut(&mut self, address: &Address) -> Option<&mut T> {
        self.records.get_mut(address)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &T)> {
        self.records.iter()
    }

    /// Allocate the (empty) membership index for a new subnet.
    pub fn allocate_subnet(&mut self, subnet_id: SubnetId) {
        self.by_subnet.entry(subnet_id).or_default();
    }

    pub fn has_subnet_index(&self, subnet_id: SubnetId) -> bool {
        self.by_subnet.contains_key(&subnet_id)
    }

    /// Addresses indexed under `subnet_id`, in join order.
    pub fn members(&self, subnet_id: SubnetId) -> Option<&[Address]> {
        self.by_subnet.get(&subnet_id).map(|v| v.as_slice())
    }

    /// All registered addresses, in registration order.
    pub fn addresses(&self) -> &[Address] {
        &self.nodes
    }

    /// Insert `record` for `address`, replacing (and returning) any prior
    /// record for that address.
    ///
    /// # Errors
    /// Returns `RegistryError::InvalidSubnet` if the record's subnet has no
    /// allocated index; nothing is changed in that case.
    pub fn insert(&mut self, address: Address, record: T) -> Result<Option<T>, RegistryError> {
        let subnet_id = record.core().subnet_id;
        if !self.by_subnet.contains_key(&subnet_id) {
            return Err(RegistryError::InvalidSubnet);
        }

        let previous = self.remove(&address);
        if let Some(members) = self.by_subnet.get_mut(&subnet_id) {
            members.push(address);
        }
        self.nodes.push(address);
        self.records.insert(address, record);
        Ok(previous)
    }

    /// Remove the record for `address` and every index entry pointing at it.
    pub fn remove(&mut self, address: &Address) -> Option<T> {
        let record = self.records.remove(address)?;
        if let Some(members) = self.by_subnet.get_mut(&record.core().subnet_id) {
            members.retain(|a| a != address);
        }
        self.nodes.retain(|a| a != address);
        Some(record)
    }
}

/// The global registry: both node stores, the global stake aggregate, and
/// persisted validator weight vectors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeRegistry {
    pub validators: NodeStore<ValidatorInfo>,
    pub miners: NodeStore<MinerInfo>,
    /// Sum of stake over every registered node of both roles.
    pub total_stake: u64,
    pub last_update: u64,
    pub validator_weights: HashMap<Address, Vec<WeightEntry>>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate both role indices for a new subnet.
    pub fn allocate_subnet(&mut self, subnet_id: SubnetId) {
        self.validators.allocate_subnet(subnet_id);
        self.miners.allocate_subnet(subnet_id);
    }

    /// Number of registered nodes of `role`.
    pub fn count(&self, role: Role) -> u64 {
        match role {
            Role::Validator => self.validators.len() as u64,
            Role::Miner => self.miners.len() as u64,
        }
    }

    /// Shared part of the record `address` holds under `role`.
    pub fn core(&self, role: Role, address: &Address) -> Option<&NodeCore> {
        match role {
            Role::Validator => self.validators.get(address).map(|v| &v.node),
            Role::Miner => self.miners.get(address).map(|m| &m.node),
        }
    }
}

/// Selects the store holding records of a given type.
pub trait Stored: NodeRecord + Sized {
    fn store(registry: &NodeRegistry) -> &NodeStore<Self>;

    fn store_mut(registry: &mut NodeRegistry) -> &mut NodeStore<Self>;

    /// Bond held in custody for this record.
    fn bond(&self) -> u64 {
        0
    }

    /// Bond owed back to the node on removal. Slashed nodes forfeit theirs.
    fn refund_due(&self) -> u64 {
        if self.core().status == NodeStatus::Slashed {
            0
        } else {
            self.bond()
        }
    }
}

impl Stored for ValidatorInfo {
    fn store(registry: &NodeRegistry) -> &NodeStore<Self> {
        &registry.validators
    }

    fn store_mut(registry: &mut NodeRegistry) -> &mut NodeStore<Self> {
        &mut registry.validators
    }

    fn bond(&self) -> u64 {
        self.bond_amount
    }
}

impl Stored for MinerInfo {
    fn store(registry: &NodeRegistry) -> &NodeStore<Self> {
        &registry.miners
    }

    fn store_mut(registry: &mut NodeRegistry) -> &mut NodeStore<Self> {
        &mut registry.miners
    }
}
