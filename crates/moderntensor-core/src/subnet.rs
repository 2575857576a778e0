// crates/moderntensor-core/src/subnet.rs

use serde::{Deserialize, Serialize};

use crate::identity::{Role, SubnetId};

/// Parameters supplied when creating a subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetParams {
    pub name: String,
    pub description: String,
    pub max_validators: u64,
    pub max_miners: u64,
    pub min_stake_validator: u64,
    pub min_stake_miner: u64,
    #[serde(default)]
    pub validator_permits_required: bool,
}

impl SubnetParams {
    /// Capacity and stake limits carried by these parameters.
    pub fn limits(&self) -> SubnetLimits {
        SubnetLimits {
            max_validators: self.max_validators,
            max_miners: self.max_miners,
            min_stake_validator: self.min_stake_validator,
            min_stake_miner: self.min_stake_miner,
        }
    }
}

/// Capacity and minimum-stake limits, adjustable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetLimits {
    pub max_validators: u64,
    pub max_miners: u64,
    pub min_stake_validator: u64,
    pub min_stake_miner: u64,
}

/// A subnet: a capacity-bounded sub-market with its own population.
///
/// `total_stake` always equals the sum of stake over every node indexed
/// under this subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetInfo {
    pub id: SubnetId,
    pub name: String,
    pub description: String,
    pub max_validators: u64,
    pub max_miners: u64,
    pub min_stake_validator: u64,
    pub min_stake_miner: u64,
    pub validator_count: u64,
    pub miner_count: u64,
    pub total_stake: u64,
    pub active: bool,
    pub created_at: u64,
    pub last_update: u64,
    pub creation_fee_paid: u64,
    pub validator_permits_required: bool,
    pub immunity_period: u64,
}

impl SubnetInfo {
    /// Minimum stake for a role in this subnet.
    pub fn min_stake(&self, role: Role) -> u64 {
        match role {
            Role::Validator => self.min_stake_validator,
            Role::Miner => self.min_stake_miner,
        }
    }

    /// Current member count for a role.
    pub fn count(&self, role: Role) -> u64 {
        match role {
            Role::Validator => self.validator_count,
            Role::Miner => self.miner_count,
        }
    }

    /// Capacity for a role.
    pub fn capacity(&self, role: Role) -> u64 {
        match role {
            Role::Validator => self.max_validators,
            Role::Miner => self.max_miners,
        }
    }

    pub fn has_capacity(&self, role: Role) -> bool {
        self.count(role) < self.capacity(role)
    }

    /// Account a node of `role` with `stake` joining the subnet.
    pub fn admit(&mut self, role: Role, stake: u64, now: u64) {
        match role {
            Role::Validator => self.validator_count += 1,
            Role::Miner => self.miner_count += 1,
        }
        self.total_stake += stake;
        self.last_update = now;
    }

    /// Account a node of `role` with `stake` leaving the subnet.
    pub fn release(&mut self, role: Role, stake: u64, now: u64) {
        match role {
            Role::Validator => self.validator_count = self.validator_count.saturating_sub(1),
            Role::Miner => self.miner_count = self.miner_count.saturating_sub(1),
        }
        self.total_stake = self.total_stake.saturating_sub(stake);
        self.last_update = now;
    }

    pub fn apply_limits(&mut self, limits: SubnetLimits, now: u64) {
        self.max_validators = limits.max_validators;
        self.max_miners = limits.max_miners;
        self.min_stake_validator = limits.min_stake_validator;
        self.min_stake_miner = limits.min_stake_miner;
        self.last_update = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subnet() -> SubnetInfo {
        SubnetInfo {
            id: 1,
            name: "text".into(),
            description: String::new(),
            max_validators: 2,
            max_miners: 10,
            min_stake_validator: 1_000_000,
            min_stake_miner: 500_000,
            validator_count: 0,
            miner_count: 0,
            total_stake: 0,
            active: true,
            created_at: 0,
            last_update: 0,
            creation_fee_paid: 0,
            validator_permits_required: false,
            immunity_period: 300,
        }
    }

    #[test]
    fn test_admit_and_release() {
        let mut s = subnet();
        s.admit(Role::Validator, 2_000_000, 10);
        s.admit(Role::Miner, 700_000, 11);
        assert_eq!(s.validator_count, 1);
        assert_eq!(s.miner_count, 1);
        assert_eq!(s.total_stake, 2_700_000);
        assert_eq!(s.last_update, 11);

        s.release(Role::Validator, 2_000_000, 12);
        assert_eq!(s.validator_count, 0);
        assert_eq!(s.total_stake, 700_000);
    }

    #[test]
    fn test_capacity() {
        let mut s = subnet();
        assert!(s.has_capacity(Role::Validator));
        s.admit(Role::Validator, 1, 0);
        s.admit(Role::Validator, 1, 0);
        assert!(!s.has_capacity(Role::Validator));
        assert!(s.has_capacity(Role::Miner));
    }

    #[test]
    fn test_role_minimums() {
        let s = subnet();
        assert_eq!(s.min_stake(Role::Validator), 1_000_000);
        assert_eq!(s.min_stake(Role::Miner), 500_000);
    }
}
