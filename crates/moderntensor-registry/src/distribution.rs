// crates/moderntensor-registry/src/distribution.rs
//
// Per-subnet reward distribution and reward claims.
//
// Distribution only credits `accumulated_rewards`; funds leave custody when a
// node claims. Eligible recipients are the subnet's Active validators and
// miners with non-zero stake, paid pro rata by stake.

use moderntensor_core::{
    Address, MinerInfo, NodeRecord, NodeStatus, RegistryError, RegistryEvent, Role, SubnetId,
    ValidatorInfo,
};
use moderntensor_economics::{distribute_pro_rata, RewardDistribution};

use crate::network::Network;
use crate::nodes::{NodeStore, Stored};

/// Active, staked members of `subnet_id` in `store`, in join order.
fn eligible<T: NodeRecord>(store: &NodeStore<T>, subnet_id: SubnetId) -> Vec<(Address, u64)> {
    store
        .members(subnet_id)
        .unwrap_or_default()
        .iter()
        .filter_map(|address| {
            let core = store.get(address)?.core();
            (core.status == NodeStatus::Active && core.stake > 0).then_some((*address, core.stake))
        })
        .collect()
}

impl Network {
    /// Credit `amount` across a subnet's eligible nodes (admin).
    ///
    /// # Errors
    /// `NotAdmin`; `InvalidSubnet` if the subnet is unknown; `InvalidParams`
    /// for a zero amount or a subnet without eligible nodes.
    pub fn distribute_rewards(
        &mut self,
        signer: &Address,
        subnet_id: SubnetId,
        amount: u64,
    ) -> Result<RewardDistribution, RegistryError> {
        self.ensure_admin(signer)?;
        if !self.state.subnets.contains(subnet_id) {
            return Err(RegistryError::InvalidSubnet);
        }
        if amount == 0 {
            return Err(RegistryError::InvalidParams(
                "reward amount must be positive".to_string(),
            ));
        }

        let registry = &self.state.registry;
        let validators = eligible(&registry.validators, subnet_id);
        let miners = eligible(&registry.miners, subnet_id);
        let roles: Vec<Role> = std::iter::repeat(Role::Validator)
            .take(validators.len())
            .chain(std::iter::repeat(Role::Miner).take(miners.len()))
            .collect();
        let shares: Vec<(Address, u64)> = validators.into_iter().chain(miners).collect();
        if shares.is_empty() {
            return Err(RegistryError::InvalidParams(format!(
                "subnet {} has no eligible nodes",
                subnet_id
            )));
        }

        let distribution = distribute_pro_rata(amount, &shares);
        let now = self.now();
        // Shares are all non-zero, so payouts line up with roles.
        for ((address, reward), role) in distribution.payouts.iter().zip(&roles) {
            let registry = &mut self.state.registry;
            let core = match role {
                Role::Validator => registry.validators.get_mut(address).map(|v| &mut v.node),
                Role::Miner => registry.miners.get_mut(address).map(|m| &mut m.node),
            };
            if let Some(core) = core {
                core.accumulated_rewards = core.accumulated_rewards.saturating_add(*reward);
            }
        }
        self.state.treasury.record_rewards(distribution.distributed);

        self.emit(RegistryEvent::RewardsDistributed {
            subnet_id,
            recipients: distribution.payouts.len() as u64,
            distributed: distribution.distributed,
            remainder: distribution.remainder,
            timestamp: now,
        });
        tracing::info!(
            "Distributed {} to {} nodes in subnet {} (remainder {})",
            distribution.distributed,
            distribution.payouts.len(),
            subnet_id,
            distribution.remainder
        );
        Ok(distribution)
    }

    /// Pay out the caller's accumulated rewards for `role`. Returns the amount.
    ///
    /// # Errors
    /// `NotRegistered`; `InvalidParams` if nothing has accumulated; a ledger
    /// error if custody cannot cover the claim.
    pub fn claim_rewards(&mut self, signer: &Address, role: Role) -> Result<u64, RegistryError> {
        match role {
            Role::Validator => self.claim::<ValidatorInfo>(signer),
            Role::Miner => self.claim::<MinerInfo>(signer),
        }
    }

    fn claim<T: Stored>(&mut self, signer: &Address) -> Result<u64, RegistryError> {
        let amount = T::store(&self.state.registry)
            .get(signer)
            .ok_or(RegistryError::NotRegistered)?
            .core()
            .accumulated_rewards;
        if amount == 0 {
            return Err(RegistryError::InvalidParams(
                "no rewards to claim".to_string(),
            ));
        }
        let admin = self.state.admin;
        if *signer != admin {
            self.ensure_custody(amount)?;
        }

        let now = self.now();
        self.state
            .treasury
            .pay_rewards(self.ledger.as_mut(), &admin, signer, amount)?;
        self.modify::<T, _>(signer, |core| {
            core.accumulated_rewards = 0;
            core.last_active_time = now;
        })?;

        self.emit(RegistryEvent::RewardsClaimed {
            address: *signer,
            role: T::ROLE,
            amount,
            timestamp: now,
        });
        tracing::info!("{} {} claimed {} in rewards", T::ROLE, signer, amount);
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        admin, fixture, miner_req, subnet_params, user, validator_req, FUNDING,
    };
    use moderntensor_core::{Ledger, SCALE};

    #[test]
    fn test_pro_rata_across_roles() {
        let (_, mut network) = fixture();
        network.create_subnet(&admin(), 1, subnet_params(2, 10)).unwrap();
        network
            .register_validator(&user(1), validator_req(1, 3_000_000, 1_000_000))
            .unwrap();
        network.register_miner(&user(2), miner_req(1, 1_000_000)).unwrap();
        network.register_miner(&user(3), miner_req(1, 1_000_000)).unwrap();
        network
            .slash_miner(&admin(), &user(3), SCALE / 2, "offline".into())
            .unwrap();

        let dist = network.distribute_rewards(&admin(), 1, 1_000).unwrap();
        assert_eq!(dist.payouts, vec![(user(1), 750), (user(2), 250)]);
        assert_eq!(network.get_validator(&user(1)).unwrap().node.accumulated_rewards, 750);
        assert_eq!(network.get_miner(&user(2)).unwrap().node.accumulated_rewards, 250);
        assert_eq!(network.get_miner(&user(3)).unwrap().node.accumulated_rewards, 0);
        assert_eq!(network.state().treasury.rewards_distributed, 1_000);
    }

    #[test]
    fn test_distribution_preconditions() {
        let (_, mut network) = fixture();
        assert_eq!(
            network.distribute_rewards(&admin(), 1, 10),
            Err(RegistryError::InvalidSubnet)
        );
        network.create_subnet(&admin(), 1, subnet_params(2, 10)).unwrap();
        assert!(matches!(
            network.distribute_rewards(&admin(), 1, 10),
            Err(RegistryError::InvalidParams(_))
        ));
        assert!(matches!(
            network.distribute_rewards(&admin(), 1, 0),
            Err(RegistryError::InvalidParams(_))
        ));
        assert_eq!(
            network.distribute_rewards(&user(1), 1, 10),
            Err(RegistryError::NotAdmin)
        );
    }

    #[test]
    fn test_claim_pays_from_custody() {
        let (_, mut network) = fixture();
        network.create_subnet(&admin(), 1, subnet_params(2, 10)).unwrap();
        network.register_miner(&user(2), miner_req(1, 1_000_000)).unwrap();
        network.distribute_rewards(&admin(), 1, 5_000).unwrap();
        let before = network.ledger().balance(&user(2));

        assert_eq!(network.claim_rewards(&user(2), Role::Miner), Ok(5_000));
        assert_eq!(network.ledger().balance(&user(2)), before + 5_000);
        assert_eq!(network.get_miner(&user(2)).unwrap().node.accumulated_rewards, 0);
        assert_eq!(network.state().treasury.rewards_claimed, 5_000);
        assert!(matches!(
            network.claim_rewards(&user(2), Role::Miner),
            Err(RegistryError::InvalidParams(_))
        ));
        assert_eq!(
            network.claim_rewards(&user(2), Role::Validator),
            Err(RegistryError::NotRegistered)
        );
        let fee = network.params().miner_registration_fee;
        assert_eq!(network.ledger().balance(&admin()), FUNDING + fee - 5_000);
    }
}
