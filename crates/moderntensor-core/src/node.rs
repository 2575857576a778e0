// crates/moderntensor-core/src/node.rs
//
// Validator and miner records.
//
// Both roles share a NodeCore (identity, stake, quality metrics, economic
// history). Validators add bond, permit, delegation, and weight-setting
// fields; miners add task counters.

use serde::{Deserialize, Serialize};

use crate::encoding::text_bytes;
use crate::error::RegistryError;
use crate::identity::{Role, SubnetId};

/// Lifecycle status of a registered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Inactive = 0,
    Active = 1,
    Jailed = 2,
    Slashed = 3,
}

impl NodeStatus {
    /// Numeric status code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Parse a numeric status code.
    ///
    /// # Errors
    /// Returns `RegistryError::InvalidStatus` for codes above 3.
    pub fn from_code(code: u8) -> Result<Self, RegistryError> {
        match code {
            0 => Ok(NodeStatus::Inactive),
            1 => Ok(NodeStatus::Active),
            2 => Ok(NodeStatus::Jailed),
            3 => Ok(NodeStatus::Slashed),
            _ => Err(RegistryError::InvalidStatus),
        }
    }
}

/// Fields common to validator and miner records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCore {
    /// Node uid bytes (1..=64 bytes).
    #[serde(with = "text_bytes")]
    pub uid: Vec<u8>,
    pub subnet_id: SubnetId,
    /// Stake in octas.
    pub stake: u64,
    /// Trust score, scaled by SCALE.
    pub trust_score: u64,
    /// Last reported performance, scaled by SCALE.
    pub last_performance: u64,
    pub accumulated_rewards: u64,
    pub slashed_amount: u64,
    pub status: NodeStatus,
    pub registration_time: u64,
    pub last_active_time: u64,
    pub last_update_time: u64,
    #[serde(with = "text_bytes")]
    pub api_endpoint: Vec<u8>,
    #[serde(with = "text_bytes")]
    pub wallet_hash: Vec<u8>,
    /// Weight, scaled by SCALE.
    pub weight: u64,
    pub stake_locked_until: u64,
    pub consecutive_failures: u64,
    pub registration_fee_paid: u64,
    pub immune_until: u64,
    pub recycling_eligible_at: u64,
    pub total_fees_paid: u64,
}

impl NodeCore {
    /// Whether the node is still inside its post-registration immunity window.
    pub fn is_immune(&self, now: u64) -> bool {
        now < self.immune_until
    }

    /// Whether the stake is still lock-protected.
    pub fn is_stake_locked(&self, now: u64) -> bool {
        now < self.stake_locked_until
    }
}

/// A validator record, keyed by the validator's address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorInfo {
    #[serde(flatten)]
    pub node: NodeCore,
    pub bond_amount: u64,
    pub bond_locked_until: u64,
    pub permit_active: bool,
    pub permit_expires_at: u64,
    pub delegation_enabled: bool,
    pub delegated_amount: u64,
    pub last_weight_set_time: u64,
}

/// A miner record, keyed by the miner's address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerInfo {
    #[serde(flatten)]
    pub node: NodeCore,
    pub tasks_completed: u64,
    pub tasks_failed: u64,
}

/// Common access to the shared part of a node record.
pub trait NodeRecord {
    /// The role this record type is registered under.
    const ROLE: Role;

    fn core(&self) -> &NodeCore;

    fn core_mut(&mut self) -> &mut NodeCore;

    /// Bookkeeping hook run when the node is slashed.
    fn on_slash(&mut self) {
        self.core_mut().consecutive_failures += 1;
    }
}

impl NodeRecord for ValidatorInfo {
    const ROLE: Role = Role::Validator;

    fn core(&self) -> &NodeCore {
        &self.node
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.node
    }
}

impl NodeRecord for MinerInfo {
    const ROLE: Role = Role::Miner;

    fn core(&self) -> &NodeCore {
        &self.node
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.node
    }

    fn on_slash(&mut self) {
        self.node.consecutive_failures += 1;
        self.tasks_failed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core() -> NodeCore {
        NodeCore {
            uid: b"miner-1".to_vec(),
            subnet_id: 1,
            stake: 1_000_000,
            trust_score: 0,
            last_performance: 0,
            accumulated_rewards: 0,
            slashed_amount: 0,
            status: NodeStatus::Active,
            registration_time: 100,
            last_active_time: 100,
            last_update_time: 100,
            api_endpoint: b"http://miner".to_vec(),
            wallet_hash: Vec::new(),
            weight: 0,
            stake_locked_until: 700,
            consecutive_failures: 0,
            registration_fee_paid: 0,
            immune_until: 400,
            recycling_eligible_at: 0,
            total_fees_paid: 0,
        }
    }

    #[test]
    fn test_status_codes() {
        for code in 0..=3u8 {
            assert_eq!(NodeStatus::from_code(code).unwrap().code(), code);
        }
        assert_eq!(NodeStatus::from_code(4), Err(RegistryError::InvalidStatus));
    }

    #[test]
    fn test_windows() {
        let node = core();
        assert!(node.is_immune(399));
        assert!(!node.is_immune(400));
        assert!(node.is_stake_locked(699));
        assert!(!node.is_stake_locked(700));
    }

    #[test]
    fn test_miner_slash_hook_counts_failed_task() {
        let mut miner = MinerInfo {
            node: core(),
            tasks_completed: 0,
            tasks_failed: 0,
        };
        miner.on_slash();
        assert_eq!(miner.tasks_failed, 1);
        assert_eq!(miner.node.consecutive_failures, 1);
    }
}
