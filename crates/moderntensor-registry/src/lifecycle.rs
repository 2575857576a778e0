// crates/moderntensor-registry/src/lifecycle.rs
//
// Node lifecycle after registration: stake changes, bond withdrawal,
// deregistration, recycling, and slashing.
//
// Removal (deregistration, recycling, transfer) always goes through `detach`,
// which keeps the subnet counters, the global stake aggregate and the
// membership indices in step with the keyed store. Bonds of removed
// validators are refunded from custody unless the validator was slashed, in
// which case the bond is forfeited to the treasury.

use moderntensor_core::validation::{deadline, has_elapsed, inactive_beyond};
use moderntensor_core::{
    Address, MinerInfo, NodeCore, NodeRecord, NodeStatus, RegistryError, RegistryEvent, Role,
    SubnetId, ValidatorInfo,
};
use moderntensor_economics::compute_slash;

use crate::network::Network;
use crate::nodes::Stored;

impl Network {
    // -----------------------------------------------------------------------
    // Stake
    // -----------------------------------------------------------------------

    pub fn add_validator_stake(
        &mut self,
        signer: &Address,
        amount: u64,
    ) -> Result<u64, RegistryError> {
        self.add_stake::<ValidatorInfo>(signer, amount)
    }

    pub fn add_miner_stake(&mut self, signer: &Address, amount: u64) -> Result<u64, RegistryError> {
        self.add_stake::<MinerInfo>(signer, amount)
    }

    pub fn withdraw_validator_stake(
        &mut self,
        signer: &Address,
        amount: u64,
    ) -> Result<u64, RegistryError> {
        self.withdraw_stake::<ValidatorInfo>(signer, amount)
    }

    pub fn withdraw_miner_stake(
        &mut self,
        signer: &Address,
        amount: u64,
    ) -> Result<u64, RegistryError> {
        self.withdraw_stake::<MinerInfo>(signer, amount)
    }

    /// Increase the caller's stake by `amount`, restarting the stake lock.
    /// Returns the new stake.
    ///
    /// # Errors
    /// - `NotRegistered` if the caller has no record of this role
    /// - `InvalidParams` for a zero amount or a total above `max_stake`
    /// - `InvalidStatus` if the node is slashed
    fn add_stake<T: Stored>(
        &mut self,
        signer: &Address,
        amount: u64,
    ) -> Result<u64, RegistryError> {
        let record = T::store(&self.state.registry)
            .get(signer)
            .ok_or(RegistryError::NotRegistered)?;
        if amount == 0 {
            return Err(RegistryError::InvalidParams(
                "stake amount must be positive".to_string(),
            ));
        }
        let core = record.core();
        if core.status == NodeStatus::Slashed {
            return Err(RegistryError::InvalidStatus);
        }
        let max_stake = self.state.params.max_stake;
        let new_stake = core
            .stake
            .checked_add(amount)
            .filter(|s| *s <= max_stake)
            .ok_or_else(|| {
                RegistryError::InvalidParams(format!("stake would exceed maximum {}", max_stake))
            })?;

        let now = self.now();
        let lock_until = deadline(now, self.state.params.stake_lock_period);
        let (subnet_id, old_stake) = self.modify::<T, _>(signer, |core| {
            let old = core.stake;
            core.stake = new_stake;
            core.stake_locked_until = lock_until;
            core.last_active_time = now;
            core.last_update_time = now;
            (core.subnet_id, old)
        })?;
        if let Some(subnet) = self.state.subnets.get_mut(subnet_id) {
            subnet.total_stake = subnet.total_stake.saturating_add(amount);
            subnet.last_update = now;
        }
        self.state.registry.total_stake = self.state.registry.total_stake.saturating_add(amount);

        self.emit_stake_changed::<T>(signer, old_stake, new_stake, now);
        Ok(new_stake)
    }

    /// Decrease the caller's stake by `amount`. Stake is a bookkeeping
    /// commitment, so no funds move. Returns the new stake.
    ///
    /// # Errors
    /// - `NotRegistered`, or `InvalidParams` for a zero amount
    /// - `StakeLocked` while the stake lock holds
    /// - `InsufficientStake` if the remainder would fall below the global or
    ///   subnet minimum
    fn withdraw_stake<T: Stored>(
        &mut self,
        signer: &Address,
        amount: u64,
    ) -> Result<u64, RegistryError> {
        let now = self.now();
        let record = T::store(&self.state.registry)
            .get(signer)
            .ok_or(RegistryError::NotRegistered)?;
        if amount == 0 {
            return Err(RegistryError::InvalidParams(
                "stake amount must be positive".to_string(),
            ));
        }
        let core = record.core();
        if core.is_stake_locked(now) {
            return Err(RegistryError::StakeLocked);
        }
        let subnet_min = self
            .state
            .subnets
            .get(core.subnet_id)
            .map_or(0, |s| s.min_stake(T::ROLE));
        let floor = self.state.params.min_stake.max(subnet_min);
        let new_stake = core
            .stake
            .checked_sub(amount)
            .filter(|s| *s >= floor)
            .ok_or(RegistryError::InsufficientStake)?;

        let (subnet_id, old_stake) = self.modify::<T, _>(signer, |core| {
            let old = core.stake;
            core.stake = new_stake;
            core.last_active_time = now;
            core.last_update_time = now;
            (core.subnet_id, old)
        })?;
        if let Some(subnet) = self.state.subnets.get_mut(subnet_id) {
            subnet.total_stake = subnet.total_stake.saturating_sub(amount);
            subnet.last_update = now;
        }
        self.state.registry.total_stake = self.state.registry.total_stake.saturating_sub(amount);

        self.emit_stake_changed::<T>(signer, old_stake, new_stake, now);
        Ok(new_stake)
    }

    fn emit_stake_changed<T: Stored>(&mut self, address: &Address, old: u64, new: u64, now: u64) {
        self.emit(RegistryEvent::StakeChanged {
            address: *address,
            role: T::ROLE,
            old_stake: old,
            new_stake: new,
            timestamp: now,
        });
        tracing::info!("{} {} stake {} -> {}", T::ROLE, address, old, new);
    }

    // -----------------------------------------------------------------------
    // Bond
    // -----------------------------------------------------------------------

    /// Return the caller's unlocked bond from custody. Returns the amount.
    ///
    /// # Errors
    /// - `NotRegistered` without a validator record
    /// - `InvalidStatus` if slashed (the bond is forfeit)
    /// - `InsufficientValidatorBond` if nothing is bonded
    /// - `ValidatorBondLocked` before `bond_locked_until`
    pub fn withdraw_validator_bond(&mut self, signer: &Address) -> Result<u64, RegistryError> {
        let now = self.now();
        let validator = self
            .state
            .registry
            .validators
            .get(signer)
            .ok_or(RegistryError::NotRegistered)?;
        if validator.node.status == NodeStatus::Slashed {
            return Err(RegistryError::InvalidStatus);
        }
        let amount = validator.bond_amount;
        if amount == 0 {
            return Err(RegistryError::InsufficientValidatorBond);
        }
        if !has_elapsed(now, validator.bond_locked_until) {
            return Err(RegistryError::ValidatorBondLocked);
        }
        self.ensure_refund(signer, validator)?;

        let admin = self.state.admin;
        self.state
            .treasury
            .release_bond(self.ledger.as_mut(), &admin, signer, amount)?;
        if let Some(validator) = self.state.registry.validators.get_mut(signer) {
            validator.bond_amount = 0;
            validator.node.last_update_time = now;
        }

        self.emit(RegistryEvent::BondReleased {
            address: *signer,
            amount,
            forfeited: false,
            timestamp: now,
        });
        tracing::info!("Validator {} withdrew bond {}", signer, amount);
        Ok(amount)
    }

    // -----------------------------------------------------------------------
    // Deregistration and recycling
    // -----------------------------------------------------------------------

    pub fn deregister_validator(
        &mut self,
        signer: &Address,
        subnet_id: SubnetId,
    ) -> Result<(), RegistryError> {
        self.deregister::<ValidatorInfo>(signer, subnet_id)
    }

    pub fn deregister_miner(
        &mut self,
        signer: &Address,
        subnet_id: SubnetId,
    ) -> Result<(), RegistryError> {
        self.deregister::<MinerInfo>(signer, subnet_id)
    }

    /// # Errors
    /// `NotRegistered`, then `InvalidSubnet` (subnet mismatch), `StakeLocked`,
    /// and `ImmunityPeriodActive`, in that order.
    fn deregister<T: Stored>(
        &mut self,
        signer: &Address,
        subnet_id: SubnetId,
    ) -> Result<(), RegistryError> {
        let now = self.now();
        let record = T::store(&self.state.registry)
            .get(signer)
            .ok_or(RegistryError::NotRegistered)?;
        let core = record.core();
        if core.subnet_id != subnet_id {
            return Err(RegistryError::InvalidSubnet);
        }
        if core.is_stake_locked(now) {
            return Err(RegistryError::StakeLocked);
        }
        if core.is_immune(now) {
            return Err(RegistryError::ImmunityPeriodActive);
        }
        self.ensure_refund(signer, record)?;

        let record = self
            .detach::<T>(signer, now)
            .ok_or(RegistryError::NotRegistered)?;
        self.settle_bond(signer, &record, now)?;

        self.emit(RegistryEvent::NodeStatusChanged {
            address: *signer,
            role: T::ROLE,
            subnet_id,
            old_status: record.core().status,
            new_status: NodeStatus::Inactive,
            timestamp: now,
        });
        tracing::info!("{} {} deregistered from subnet {}", T::ROLE, signer, subnet_id);
        Ok(())
    }

    /// Remove a long-inactive node on anyone's behalf and pay the caller the
    /// recycling reward. Returns the reward paid.
    ///
    /// # Errors
    /// `NotRegistered`; `RecyclingNotAvailable` until the node has been
    /// inactive longer than the recycle period; `ImmunityPeriodActive` while
    /// it is still immune.
    pub fn recycle_node(
        &mut self,
        recycler: &Address,
        address: &Address,
        role: Role,
    ) -> Result<u64, RegistryError> {
        match role {
            Role::Validator => self.recycle::<ValidatorInfo>(recycler, address),
            Role::Miner => self.recycle::<MinerInfo>(recycler, address),
        }
    }

    fn recycle<T: Stored>(
        &mut self,
        recycler: &Address,
        address: &Address,
    ) -> Result<u64, RegistryError> {
        let now = self.now();
        let record = T::store(&self.state.registry)
            .get(address)
            .ok_or(RegistryError::NotRegistered)?;
        let core = record.core();
        if !inactive_beyond(now, core.last_active_time, self.state.params.recycle_period) {
            return Err(RegistryError::RecyclingNotAvailable);
        }
        if core.is_immune(now) {
            return Err(RegistryError::ImmunityPeriodActive);
        }

        let admin = self.state.admin;
        let reward = self.state.params.recycling_reward;
        let mut owed = 0u64;
        if *recycler != admin {
            owed = owed.saturating_add(reward);
        }
        if *address != admin {
            owed = owed.saturating_add(record.refund_due());
        }
        self.ensure_custody(owed)?;

        let record = self
            .detach::<T>(address, now)
            .ok_or(RegistryError::NotRegistered)?;
        self.settle_bond(address, &record, now)?;
        self.state
            .treasury
            .pay_recycling_reward(self.ledger.as_mut(), &admin, recycler, reward)?;

        self.emit(RegistryEvent::NodeRecycled {
            address: *address,
            role: T::ROLE,
            recycler: *recycler,
            reward,
            timestamp: now,
        });
        tracing::info!(
            "{} {} recycled by {} (reward {})",
            T::ROLE,
            address,
            recycler,
            reward
        );
        Ok(reward)
    }

    // -----------------------------------------------------------------------
    // Slashing
    // -----------------------------------------------------------------------

    pub fn slash_validator(
        &mut self,
        signer: &Address,
        address: &Address,
        slash_percentage: u64,
        reason: String,
    ) -> Result<u64, RegistryError> {
        self.slash::<ValidatorInfo>(signer, address, slash_percentage, reason)
    }

    pub fn slash_miner(
        &mut self,
        signer: &Address,
        address: &Address,
        slash_percentage: u64,
        reason: String,
    ) -> Result<u64, RegistryError> {
        self.slash::<MinerInfo>(signer, address, slash_percentage, reason)
    }

    /// Slash `slash_percentage` (SCALE-based) of a node's stake (admin).
    /// Returns the slashed amount.
    ///
    /// # Errors
    /// `NotAdmin`, `NotRegistered`, `SlashingNotAllowed` if already slashed,
    /// `InvalidParams` if the percentage exceeds SCALE.
    fn slash<T: Stored>(
        &mut self,
        signer: &Address,
        address: &Address,
        slash_percentage: u64,
        reason: String,
    ) -> Result<u64, RegistryError> {
        self.ensure_admin(signer)?;
        let record = T::store(&self.state.registry)
            .get(address)
            .ok_or(RegistryError::NotRegistered)?;
        if record.core().status == NodeStatus::Slashed {
            return Err(RegistryError::SlashingNotAllowed);
        }
        let outcome = compute_slash(record.core().stake, slash_percentage)?;

        let now = self.now();
        let record = T::store_mut(&mut self.state.registry)
            .get_mut(address)
            .ok_or(RegistryError::NotRegistered)?;
        let core = record.core_mut();
        core.stake = outcome.remaining_stake;
        core.slashed_amount = core.slashed_amount.saturating_add(outcome.amount);
        core.status = NodeStatus::Slashed;
        core.last_update_time = now;
        let subnet_id = core.subnet_id;
        record.on_slash();

        if let Some(subnet) = self.state.subnets.get_mut(subnet_id) {
            subnet.total_stake = subnet.total_stake.saturating_sub(outcome.amount);
            subnet.last_update = now;
        }
        let registry = &mut self.state.registry;
        registry.total_stake = registry.total_stake.saturating_sub(outcome.amount);
        registry.last_update = now;
        self.state.treasury.record_slash(outcome.amount);

        tracing::warn!(
            "{} {} slashed {} ({}): {}",
            T::ROLE,
            address,
            outcome.amount,
            slash_percentage,
            reason
        );
        self.emit(RegistryEvent::Slashed {
            address: *address,
            role: T::ROLE,
            subnet_id,
            amount: outcome.amount,
            percentage: slash_percentage,
            reason,
            timestamp: now,
        });
        Ok(outcome.amount)
    }

    // -----------------------------------------------------------------------
    // Shared removal helpers
    // -----------------------------------------------------------------------

    /// Apply `f` to an existing record's core fields.
    pub(crate) fn modify<T: Stored, R>(
        &mut self,
        address: &Address,
        f: impl FnOnce(&mut NodeCore) -> R,
    ) -> Result<R, RegistryError> {
        let record = T::store_mut(&mut self.state.registry)
            .get_mut(address)
            .ok_or(RegistryError::NotRegistered)?;
        Ok(f(record.core_mut()))
    }

    /// Remove a record and release everything it holds in the aggregates.
    pub(crate) fn detach<T: Stored>(&mut self, address: &Address, now: u64) -> Option<T> {
        let record = T::store_mut(&mut self.state.registry).remove(address)?;
        let core = record.core();
        if let Some(subnet) = self.state.subnets.get_mut(core.subnet_id) {
            subnet.release(T::ROLE, core.stake, now);
        }
        let registry = &mut self.state.registry;
        registry.total_stake = registry.total_stake.saturating_sub(core.stake);
        registry.last_update = now;
        if T::ROLE == Role::Validator {
            registry.validator_weights.remove(address);
        }
        Some(record)
    }

    /// Whether custody can refund the bond `record` is owed on removal.
    pub(crate) fn ensure_refund<T: Stored>(
        &self,
        address: &Address,
        record: &T,
    ) -> Result<(), RegistryError> {
        if *address == self.state.admin {
            return Ok(());
        }
        self.ensure_custody(record.refund_due())
    }

    /// Refund or forfeit the bond held for a removed record.
    pub(crate) fn settle_bond<T: Stored>(
        &mut self,
        address: &Address,
        record: &T,
        now: u64,
    ) -> Result<(), RegistryError> {
        let amount = record.bond();
        if amount == 0 {
            return Ok(());
        }
        let forfeited = record.core().status == NodeStatus::Slashed;
        if forfeited {
            self.state.treasury.forfeit_bond(amount);
        } else {
            let admin = self.state.admin;
            self.state
                .treasury
                .release_bond(self.ledger.as_mut(), &admin, address, amount)?;
        }
        self.emit(RegistryEvent::BondReleased {
            address: *address,
            amount,
            forfeited,
            timestamp: now,
        });
        Ok(())
    }
}
