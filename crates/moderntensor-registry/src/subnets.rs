// crates/moderntensor-registry/src/subnets.rs
//
// Subnet Directory: subnet id -> configuration, capacity and stake aggregates.
//
// Subnets are never deleted, only deactivated. Creating a subnet allocates
// its validator and miner membership indices in the same step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use moderntensor_core::{
    Address, EconomicParams, FeeReason, RegistryError, RegistryEvent, Role, SubnetId, SubnetInfo,
    SubnetLimits, SubnetParams,
};

use crate::network::Network;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubnetDirectory {
    subnets: BTreeMap<SubnetId, SubnetInfo>,
}

impl SubnetDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.subnets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subnets.is_empty()
    }

    pub fn contains(&self, id: SubnetId) -> bool {
        self.subnets.contains_key(&id)
    }

    pub fn get(&self, id: SubnetId) -> Option<&SubnetInfo> {
        self.subnets.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: SubnetId) -> Option<&mut SubnetInfo> {
        self.subnets.get_mut(&id)
    }

    /// Subnets in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &SubnetInfo> {
        self.subnets.values()
    }

    /// The subnet `id`, provided it exists and is active.
    ///
    /// # Errors
    /// Returns `RegistryError::InvalidSubnet` otherwise.
    pub fn active(&self, id: SubnetId) -> Result<&SubnetInfo, RegistryError> {
        match self.subnets.get(&id) {
            Some(subnet) if subnet.active => Ok(subnet),
            _ => Err(RegistryError::InvalidSubnet),
        }
    }

    pub(crate) fn insert(&mut self, subnet: SubnetInfo) {
        self.subnets.insert(subnet.id, subnet);
    }
}

/// Caps must admit at least one node and minimum stakes must sit inside the
/// global stake range.
fn check_limits(limits: &SubnetLimits, params: &EconomicParams) -> Result<(), RegistryError> {
    if limits.max_validators == 0 || limits.max_miners == 0 {
        return Err(RegistryError::InvalidParams(
            "subnet capacity must be at least 1".to_string(),
        ));
    }
    for (role, min) in [
        (Role::Validator, limits.min_stake_validator),
        (Role::Miner, limits.min_stake_miner),
    ] {
        if min < params.min_stake || min > params.max_stake {
            return Err(RegistryError::InvalidParams(format!(
                "{} minimum stake {} outside [{}, {}]",
                role, min, params.min_stake, params.max_stake
            )));
        }
    }
    Ok(())
}

impl Network {
    /// Create subnet `id`.
    ///
    /// Non-administrator creators pay the subnet creation fee.
    ///
    /// # Errors
    /// - `InvalidSubnet` if `id` is taken
    /// - `InvalidParams` for zero caps or out-of-range minimum stakes
    /// - `SubnetCreationFeeRequired` if the creator cannot pay the fee
    pub fn create_subnet(
        &mut self,
        signer: &Address,
        id: SubnetId,
        params: SubnetParams,
    ) -> Result<SubnetInfo, RegistryError> {
        if self.state.subnets.contains(id) {
            return Err(RegistryError::InvalidSubnet);
        }
        check_limits(&params.limits(), &self.state.params)?;

        let is_admin = *signer == self.state.admin;
        let fee = if is_admin {
            0
        } else {
            self.state.params.subnet_creation_fee
        };
        self.ensure_funds(signer, fee, RegistryError::SubnetCreationFeeRequired)?;

        let now = self.now();
        if !is_admin {
            self.charge_fee(signer, fee, FeeReason::SubnetCreation, now)?;
        }

        let subnet = SubnetInfo {
            id,
            name: params.name,
            description: params.description,
            max_validators: params.max_validators,
            max_miners: params.max_miners,
            min_stake_validator: params.min_stake_validator,
            min_stake_miner: params.min_stake_miner,
            validator_count: 0,
            miner_count: 0,
            total_stake: 0,
            active: true,
            created_at: now,
            last_update: now,
            creation_fee_paid: fee,
            validator_permits_required: params.validator_permits_required,
            immunity_period: self.state.params.immunity_period,
        };
        self.state.registry.allocate_subnet(id);
        self.state.subnets.insert(subnet.clone());

        self.emit(RegistryEvent::SubnetCreated {
            subnet_id: id,
            creator: *signer,
            name: subnet.name.clone(),
            fee_paid: fee,
            timestamp: now,
        });
        tracing::info!(
            "Subnet {} '{}' created by {} (fee {})",
            id,
            subnet.name,
            signer,
            fee
        );
        Ok(subnet)
    }

    /// Adjust a subnet's caps and minimum stakes (admin).
    ///
    /// # Errors
    /// `InvalidSubnet` if absent; `InvalidParams` if a cap falls below the
    /// current population or a minimum stake is out of range.
    pub fn update_subnet_params(
        &mut self,
        signer: &Address,
        id: SubnetId,
        limits: SubnetLimits,
    ) -> Result<(), RegistryError> {
        self.ensure_admin(signer)?;
        let subnet = self
            .state
            .subnets
            .get(id)
            .ok_or(RegistryError::InvalidSubnet)?;
        check_limits(&limits, &self.state.params)?;
        if limits.max_validators < subnet.validator_count || limits.max_miners < subnet.miner_count
        {
            return Err(RegistryError::InvalidParams(format!(
                "caps {}/{} below current population {}/{}",
                limits.max_validators,
                limits.max_miners,
                subnet.validator_count,
                subnet.miner_count
            )));
        }

        let now = self.now();
        if let Some(subnet) = self.state.subnets.get_mut(id) {
            subnet.apply_limits(limits, now);
        }
        self.emit(RegistryEvent::SubnetUpdated {
            subnet_id: id,
            timestamp: now,
        });
        tracing::info!("Subnet {} limits updated", id);
        Ok(())
    }

    /// Activate or deactivate a subnet (admin).
    pub fn set_subnet_status(
        &mut self,
        signer: &Address,
        id: SubnetId,
        active: bool,
    ) -> Result<(), RegistryError> {
        self.ensure_admin(signer)?;
        let now = self.now();
        let subnet = self
            .state
            .subnets
            .get_mut(id)
            .ok_or(RegistryError::InvalidSubnet)?;
        subnet.active = active;
        subnet.last_update = now;

        self.emit(RegistryEvent::SubnetStatusChanged {
            subnet_id: id,
            active,
            timestamp: now,
        });
        tracing::info!("Subnet {} active={}", id, active);
        Ok(())
    }

    /// Stop requiring validator permits in a subnet (admin).
    pub fn disable_subnet_permit_requirement(
        &mut self,
        signer: &Address,
        id: SubnetId,
    ) -> Result<(), RegistryError> {
        self.ensure_admin(signer)?;
        let now = self.now();
        let subnet = self
            .state
            .subnets
            .get_mut(id)
            .ok_or(RegistryError::InvalidSubnet)?;
        subnet.validator_permits_required = false;
        subnet.last_update = now;

        self.emit(RegistryEvent::SubnetUpdated {
            subnet_id: id,
            timestamp: now,
        });
        tracing::info!("Subnet {} no longer requires validator permits", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin, fixture, subnet_params, user, FUNDING};
    use moderntensor_core::Ledger;

    #[test]
    fn test_admin_creates_for_free() {
        let (_, mut network) = fixture();
        let subnet = network.create_subnet(&admin(), 1, subnet_params(2, 10)).unwrap();
        assert_eq!(subnet.creation_fee_paid, 0);
        assert!(subnet.active);
        assert_eq!(network.state().treasury.total_fees_collected, 0);
        assert!(network.state().registry.validators.has_subnet_index(1));
        assert!(network.state().registry.miners.has_subnet_index(1));
    }

    #[test]
    fn test_user_pays_creation_fee() {
        let (_, mut network) = fixture();
        let fee = network.params().subnet_creation_fee;
        let subnet = network.create_subnet(&user(1), 5, subnet_params(2, 10)).unwrap();
        assert_eq!(subnet.creation_fee_paid, fee);
        assert_eq!(network.ledger().balance(&user(1)), FUNDING - fee);
        assert_eq!(network.state().treasury.subnet_creation_fees, fee);
        assert_eq!(network.state().treasury.total_burned, fee / 2);
        let events = network.drain_events();
        assert!(matches!(
            events[0],
            RegistryEvent::FeeBurned {
                reason: FeeReason::SubnetCreation,
                ..
            }
        ));
        assert!(matches!(events[1], RegistryEvent::SubnetCreated { subnet_id: 5, .. }));
    }

    #[test]
    fn test_broke_creator_rejected() {
        let (_, mut network) = fixture();
        let broke = Address::repeat_byte(0xee);
        assert_eq!(
            network.create_subnet(&broke, 1, subnet_params(2, 10)),
            Err(RegistryError::SubnetCreationFeeRequired)
        );
        assert!(network.get_subnet(1).is_none());
        assert!(network.pending_events().is_empty());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let (_, mut network) = fixture();
        network.create_subnet(&admin(), 1, subnet_params(2, 10)).unwrap();
        assert_eq!(
            network.create_subnet(&admin(), 1, subnet_params(2, 10)),
            Err(RegistryError::InvalidSubnet)
        );
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let (_, mut network) = fixture();
        assert!(matches!(
            network.create_subnet(&admin(), 1, subnet_params(0, 10)),
            Err(RegistryError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_status_and_permit_flag_are_admin_only() {
        let (_, mut network) = fixture();
        let mut params = subnet_params(2, 10);
        params.validator_permits_required = true;
        network.create_subnet(&admin(), 1, params).unwrap();

        assert_eq!(
            network.set_subnet_status(&user(1), 1, false),
            Err(RegistryError::NotAdmin)
        );
        network.set_subnet_status(&admin(), 1, false).unwrap();
        assert_eq!(
            network.state().subnets.active(1),
            Err(RegistryError::InvalidSubnet)
        );

        network.disable_subnet_permit_requirement(&admin(), 1).unwrap();
        assert!(!network.get_subnet(1).unwrap().validator_permits_required);
        assert_eq!(
            network.disable_subnet_permit_requirement(&admin(), 9),
            Err(RegistryError::InvalidSubnet)
        );
    }

    #[test]
    fn test_update_limits() {
        let (_, mut network) = fixture();
        network.create_subnet(&admin(), 1, subnet_params(2, 10)).unwrap();
        let mut limits = subnet_params(2, 10).limits();
        limits.max_validators = 4;
        network.update_subnet_params(&admin(), 1, limits).unwrap();
        assert_eq!(network.get_subnet(1).unwrap().max_validators, 4);
        assert_eq!(
            network.update_subnet_params(&admin(), 2, limits),
            Err(RegistryError::InvalidSubnet)
        );
    }
}
