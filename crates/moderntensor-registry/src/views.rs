// crates/moderntensor-registry/src/views.rs
//
// Read-only projections of registry state for external clients.
//
// Nothing here mutates. Transfer-eligibility checks re-run the registration
// admission predicates (plus the custody check for a validator's old bond)
// and report the first failure as its reason code.

use serde::{Deserialize, Serialize};

use moderntensor_core::validation::{inactive_beyond, remaining};
use moderntensor_core::{
    Address, EconomicParams, MinerInfo, NodeRecord, NodeStatus, RegistryError, Role, SubnetId,
    SubnetInfo, ValidatorInfo,
};
use moderntensor_economics::TreasuryStats;

use crate::network::Network;
use crate::nodes::{NodeStore, Stored};
use crate::permits::ValidatorPermit;
use crate::registration::Candidate;
use crate::weights::WeightEntry;

/// Network-wide aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub total_validators: u64,
    pub total_miners: u64,
    pub total_subnets: u64,
    pub total_stake: u64,
    pub active_validators: u64,
    pub active_miners: u64,
}

/// The fees the registry currently charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeInfo {
    pub miner_fee: u64,
    pub validator_fee: u64,
    pub subnet_fee: u64,
    pub permit_fee: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownStatus {
    pub active: bool,
    pub cooldown_until: u64,
    /// Seconds until registration is allowed again.
    pub remaining: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEligibility {
    pub eligible: bool,
    /// Machine-readable reason code when not eligible.
    pub reason: Option<String>,
}

impl TransferEligibility {
    fn from_result(result: Result<(), RegistryError>) -> Self {
        match result {
            Ok(()) => Self {
                eligible: true,
                reason: None,
            },
            Err(e) => Self {
                eligible: false,
                reason: Some(e.code().to_string()),
            },
        }
    }
}

fn page<'a, T: NodeRecord>(
    store: &'a NodeStore<T>,
    addresses: &[Address],
    offset: usize,
    limit: usize,
) -> Vec<(Address, &'a T)> {
    addresses
        .iter()
        .skip(offset)
        .take(limit)
        .filter_map(|a| store.get(a).map(|record| (*a, record)))
        .collect()
}

fn count_active<T: NodeRecord>(store: &NodeStore<T>) -> u64 {
    store
        .iter()
        .filter(|(_, record)| record.core().status == NodeStatus::Active)
        .count() as u64
}

impl Network {
    pub fn get_validator(&self, address: &Address) -> Option<&ValidatorInfo> {
        self.state.registry.validators.get(address)
    }

    pub fn get_miner(&self, address: &Address) -> Option<&MinerInfo> {
        self.state.registry.miners.get(address)
    }

    pub fn get_subnet(&self, id: SubnetId) -> Option<&SubnetInfo> {
        self.state.subnets.get(id)
    }

    /// Subnets in id order.
    pub fn list_subnets(&self, offset: usize, limit: usize) -> Vec<&SubnetInfo> {
        self.state.subnets.iter().skip(offset).take(limit).collect()
    }

    /// Validators in registration order.
    pub fn list_validators(&self, offset: usize, limit: usize) -> Vec<(Address, &ValidatorInfo)> {
        let store = &self.state.registry.validators;
        page(store, store.addresses(), offset, limit)
    }

    /// Miners in registration order.
    pub fn list_miners(&self, offset: usize, limit: usize) -> Vec<(Address, &MinerInfo)> {
        let store = &self.state.registry.miners;
        page(store, store.addresses(), offset, limit)
    }

    /// Validators of one subnet in join order.
    ///
    /// # Errors
    /// `InvalidSubnet` if the subnet is unknown.
    pub fn list_subnet_validators(
        &self,
        subnet_id: SubnetId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<(Address, &ValidatorInfo)>, RegistryError> {
        self.list_subnet_members::<ValidatorInfo>(subnet_id, offset, limit)
    }

    pub fn list_subnet_miners(
        &self,
        subnet_id: SubnetId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<(Address, &MinerInfo)>, RegistryError> {
        self.list_subnet_members::<MinerInfo>(subnet_id, offset, limit)
    }

    fn list_subnet_members<T: Stored>(
        &self,
        subnet_id: SubnetId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<(Address, &T)>, RegistryError> {
        let store = T::store(&self.state.registry);
        let members = store
            .members(subnet_id)
            .ok_or(RegistryError::InvalidSubnet)?;
        Ok(page(store, members, offset, limit))
    }

    pub fn network_stats(&self) -> NetworkStats {
        let registry = &self.state.registry;
        NetworkStats {
            total_validators: registry.count(Role::Validator),
            total_miners: registry.count(Role::Miner),
            total_subnets: self.state.subnets.len() as u64,
            total_stake: registry.total_stake,
            active_validators: count_active(&registry.validators),
            active_miners: count_active(&registry.miners),
        }
    }

    pub fn treasury_stats(&self) -> TreasuryStats {
        self.state.treasury.stats()
    }

    /// Fees read from the same parameters the charging paths use.
    pub fn registration_fee_info(&self) -> FeeInfo {
        let params = &self.state.params;
        FeeInfo {
            miner_fee: params.miner_registration_fee,
            validator_fee: params.validator_registration_fee,
            subnet_fee: params.subnet_creation_fee,
            permit_fee: params.validator_permit_price,
        }
    }

    pub fn economic_params(&self) -> EconomicParams {
        self.state.params.clone()
    }

    pub fn has_valid_permit(&self, address: &Address, subnet_id: SubnetId) -> bool {
        self.state
            .permits
            .has_valid_permit(address, subnet_id, self.now())
    }

    pub fn validator_permit(&self, address: &Address) -> Option<&ValidatorPermit> {
        self.state.permits.permit(address)
    }

    pub fn cooldown_status(&self, address: &Address) -> CooldownStatus {
        let now = self.now();
        match self.state.permits.cooldown(address) {
            Some(cooldown) => CooldownStatus {
                active: self.state.permits.is_cooling_down(address, now),
                cooldown_until: cooldown.cooldown_until,
                remaining: remaining(now, cooldown.cooldown_until),
            },
            None => CooldownStatus {
                active: false,
                cooldown_until: 0,
                remaining: 0,
            },
        }
    }

    /// Whether `recycle_node` would currently accept this node.
    pub fn is_recyclable(&self, address: &Address, role: Role) -> bool {
        let now = self.now();
        self.state.registry.core(role, address).is_some_and(|core| {
            inactive_beyond(now, core.last_active_time, self.state.params.recycle_period)
                && !core.is_immune(now)
        })
    }

    pub fn validator_weights(&self, validator: &Address) -> Option<&[WeightEntry]> {
        self.state
            .registry
            .validator_weights
            .get(validator)
            .map(|v| v.as_slice())
    }

    /// Whether the validator could move to `new_subnet_id` with the given
    /// stake and bond right now.
    pub fn can_validator_transfer_subnet(
        &self,
        address: &Address,
        new_subnet_id: SubnetId,
        stake: u64,
        bond: u64,
    ) -> TransferEligibility {
        TransferEligibility::from_result(self.check_transfer(
            address,
            Role::Validator,
            new_subnet_id,
            stake,
            bond,
        ))
    }

    pub fn can_miner_transfer_subnet(
        &self,
        address: &Address,
        new_subnet_id: SubnetId,
        stake: u64,
    ) -> TransferEligibility {
        TransferEligibility::from_result(self.check_transfer(
            address,
            Role::Miner,
            new_subnet_id,
            stake,
            0,
        ))
    }

    fn check_transfer(
        &self,
        address: &Address,
        role: Role,
        new_subnet_id: SubnetId,
        stake: u64,
        bond: u64,
    ) -> Result<(), RegistryError> {
        let core = self
            .state
            .registry
            .core(role, address)
            .ok_or(RegistryError::NotRegistered)?;
        self.check_admission(
            address,
            &Candidate {
                role,
                uid: &core.uid,
                api_endpoint: &core.api_endpoint,
                subnet_id: new_subnet_id,
                stake,
                bond,
            },
            self.now(),
        )?;
        if role == Role::Validator {
            if let Some(previous) = self.state.registry.validators.get(address) {
                self.ensure_refund(address, previous)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin, fixture, miner_req, subnet_params, user, validator_req};

    #[test]
    fn test_pagination() {
        let (_, mut network) = fixture();
        network.create_subnet(&admin(), 1, subnet_params(2, 10)).unwrap();
        network.create_subnet(&admin(), 2, subnet_params(2, 10)).unwrap();
        for n in 1..=5u8 {
            let subnet = if n % 2 == 0 { 2 } else { 1 };
            network.register_miner(&user(n), miner_req(subnet, 1_000_000)).unwrap();
        }

        let page = network.list_miners(1, 2);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].0, user(2));
        assert_eq!(network.list_miners(4, 10).len(), 1);
        assert!(network.list_miners(9, 10).is_empty());

        let subnet_one = network.list_subnet_miners(1, 0, 10).unwrap();
        let addresses: Vec<Address> = subnet_one.iter().map(|(a, _)| *a).collect();
        assert_eq!(addresses, vec![user(1), user(3), user(5)]);
        assert_eq!(
            network.list_subnet_validators(7, 0, 10).unwrap_err(),
            RegistryError::InvalidSubnet
        );
        assert_eq!(network.list_subnets(0, 10).len(), 2);
    }

    #[test]
    fn test_network_stats_counts_active() {
        let (_, mut network) = fixture();
        network.create_subnet(&admin(), 1, subnet_params(2, 10)).unwrap();
        network
            .register_validator(&user(1), validator_req(1, 2_000_000, 2_000_000))
            .unwrap();
        network.register_miner(&user(2), miner_req(1, 1_000_000)).unwrap();
        network.register_miner(&user(3), miner_req(1, 1_000_000)).unwrap();
        network
            .slash_miner(&admin(), &user(3), 0, "warning".into())
            .unwrap();

        let stats = network.network_stats();
        assert_eq!(stats.total_validators, 1);
        assert_eq!(stats.total_miners, 2);
        assert_eq!(stats.active_miners, 1);
        assert_eq!(stats.total_subnets, 1);
        assert_eq!(stats.total_stake, 4_000_000);
    }

    #[test]
    fn test_fee_info_tracks_params() {
        let (_, mut network) = fixture();
        let info = network.registration_fee_info();
        assert_eq!(info.miner_fee, network.params().miner_registration_fee);
        assert_eq!(info.permit_fee, network.params().validator_permit_price);

        let params = EconomicParams {
            subnet_creation_fee: 42,
            ..network.params().clone()
        };
        network.update_global_params(&admin(), params).unwrap();
        assert_eq!(network.registration_fee_info().subnet_fee, 42);
    }

    #[test]
    fn test_cooldown_status() {
        let (clock, mut network) = fixture();
        network.create_subnet(&admin(), 1, subnet_params(2, 10)).unwrap();
        assert!(!network.cooldown_status(&user(1)).active);
        network.register_miner(&user(1), miner_req(1, 1_000_000)).unwrap();
        let status = network.cooldown_status(&user(1));
        assert!(status.active);
        assert_eq!(status.remaining, network.params().registration_cooldown);
        clock.advance(status.remaining);
        assert!(!network.cooldown_status(&user(1)).active);
    }

    #[test]
    fn test_transfer_eligibility_reasons() {
        let (clock, mut network) = fixture();
        network.create_subnet(&admin(), 1, subnet_params(2, 10)).unwrap();
        network.create_subnet(&admin(), 2, subnet_params(2, 10)).unwrap();
        network.register_miner(&user(1), miner_req(1, 1_000_000)).unwrap();

        let check = network.can_miner_transfer_subnet(&user(1), 2, 1_000_000);
        assert_eq!(check.reason.as_deref(), Some("registration_cooldown_active"));

        clock.advance(network.params().registration_cooldown);
        assert!(network.can_miner_transfer_subnet(&user(1), 2, 1_000_000).eligible);
        assert_eq!(
            network
                .can_miner_transfer_subnet(&user(1), 1, 1_000_000)
                .reason
                .as_deref(),
            Some("already_registered")
        );
        assert_eq!(
            network
                .can_validator_transfer_subnet(&user(1), 2, 2_000_000, 2_000_000)
                .reason
                .as_deref(),
            Some("not_registered")
        );
        assert_eq!(
            network
                .can_miner_transfer_subnet(&user(1), 9, 1_000_000)
                .reason
                .as_deref(),
            Some("invalid_subnet")
        );
    }

    #[test]
    fn test_validator_transfer_needs_custody_for_old_bond() {
        use std::sync::Arc;

        use moderntensor_core::{EconomicParams, Ledger, ManualClock};
        use moderntensor_economics::InMemoryLedger;

        use crate::test_support::{validator_req, GENESIS_TIME};

        // Custody starts empty and only holds what registrations pay in.
        let clock = Arc::new(ManualClock::new(GENESIS_TIME));
        let funded = 50_000_000;
        let ledger = InMemoryLedger::with_balances([(user(1), funded), (user(2), funded)]);
        let mut network = Network::initialize(
            admin(),
            EconomicParams::default(),
            Box::new(ledger),
            clock.clone(),
        )
        .unwrap();
        for id in 1..=3 {
            network.create_subnet(&admin(), id, subnet_params(2, 10)).unwrap();
        }
        network
            .register_validator(&user(1), validator_req(1, 2_000_000, 1_000_000))
            .unwrap();
        network.register_miner(&user(2), miner_req(2, 1_000_000)).unwrap();
        clock.advance(network.params().registration_cooldown);
        assert!(network
            .can_validator_transfer_subnet(&user(1), 3, 2_000_000, 1_000_000)
            .eligible);

        // Drain custody: the lone miner of subnet 2 claims everything it holds.
        let custody = network.ledger().balance(&admin());
        network.distribute_rewards(&admin(), 2, custody).unwrap();
        assert_eq!(network.claim_rewards(&user(2), Role::Miner).unwrap(), custody);
        assert_eq!(network.ledger().balance(&admin()), 0);

        let check = network.can_validator_transfer_subnet(&user(1), 3, 2_000_000, 1_000_000);
        assert!(!check.eligible);
        assert_eq!(check.reason.as_deref(), Some("ledger_error"));
        assert!(matches!(
            network.register_validator(&user(1), validator_req(3, 2_000_000, 1_000_000)),
            Err(RegistryError::Ledger(_))
        ));
        assert_eq!(network.get_validator(&user(1)).unwrap().node.subnet_id, 1);
    }
}
