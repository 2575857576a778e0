// crates/moderntensor-registry/src/registration.rs
//
// Validator and miner registration, including subnet transfer.
//
// Admission is checked in a fixed order and the first failure wins:
//   uid, endpoint, stake range, bond range (validators), cooldown, subnet
//   active, subnet role minimum, subnet capacity, permit (validators),
//   existing record (same subnet / transfer / global cap), funds.
// Only after every check passes are fees charged, the bond locked, any
// previous record removed, and the fresh record inserted.
//
// A transfer discards the previous record's history, including unclaimed
// rewards, and settles its bond before the new one takes over.

use serde::{Deserialize, Serialize};

use moderntensor_core::encoding::text_bytes;
use moderntensor_core::validation::{
    check_bond, check_endpoint, check_stake, check_uid, deadline,
};
use moderntensor_core::{
    Address, FeeReason, MinerInfo, NodeCore, NodeRecord, NodeStatus, RegistryError,
    RegistryEvent, Role, SubnetId, ValidatorInfo, DEFAULT_TRUST_SCORE, DEFAULT_WEIGHT,
};

use crate::network::Network;
use crate::nodes::Stored;

/// Arguments of a validator registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRegistration {
    #[serde(with = "text_bytes")]
    pub uid: Vec<u8>,
    pub subnet_id: SubnetId,
    pub stake: u64,
    pub bond: u64,
    #[serde(default, with = "text_bytes")]
    pub wallet_hash: Vec<u8>,
    #[serde(with = "text_bytes")]
    pub api_endpoint: Vec<u8>,
}

/// Arguments of a miner registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerRegistration {
    #[serde(with = "text_bytes")]
    pub uid: Vec<u8>,
    pub subnet_id: SubnetId,
    pub stake: u64,
    #[serde(default, with = "text_bytes")]
    pub wallet_hash: Vec<u8>,
    #[serde(with = "text_bytes")]
    pub api_endpoint: Vec<u8>,
}

/// The role-independent view of a registration request.
pub(crate) struct Candidate<'a> {
    pub role: Role,
    pub uid: &'a [u8],
    pub api_endpoint: &'a [u8],
    pub subnet_id: SubnetId,
    pub stake: u64,
    /// Always zero for miners.
    pub bond: u64,
}

/// Outcome of a successful admission check.
pub(crate) struct Admission {
    pub fee: u64,
    /// Subnet the address is leaving, when this is a transfer.
    pub transferred_from: Option<SubnetId>,
}

impl Network {
    /// Register the caller as a validator of `req.subnet_id`, or move its
    /// validator record there from another subnet.
    ///
    /// # Errors
    /// Any admission failure; see the module docs for the check order.
    pub fn register_validator(
        &mut self,
        signer: &Address,
        req: ValidatorRegistration,
    ) -> Result<(), RegistryError> {
        let now = self.now();
        let admission = self.check_admission(
            signer,
            &Candidate {
                role: Role::Validator,
                uid: &req.uid,
                api_endpoint: &req.api_endpoint,
                subnet_id: req.subnet_id,
                stake: req.stake,
                bond: req.bond,
            },
            now,
        )?;
        if let Some(previous) = self.state.registry.validators.get(signer) {
            self.ensure_refund(signer, previous)?;
        }

        // Commit.
        let admin = self.state.admin;
        self.charge_fee(signer, admission.fee, FeeReason::ValidatorRegistration, now)?;
        self.state
            .treasury
            .lock_bond(self.ledger.as_mut(), signer, &admin, req.bond)?;
        if let Some(previous) = self.detach::<ValidatorInfo>(signer, now) {
            self.settle_bond(signer, &previous, now)?;
        }

        let lock_until = deadline(now, self.state.params.stake_lock_period);
        let (permit_active, permit_expires_at) = match self.state.permits.permit(signer) {
            Some(permit) if permit.is_valid_for(req.subnet_id, now) => (true, permit.expires_at),
            _ => (false, 0),
        };
        let record = ValidatorInfo {
            node: self.fresh_core(
                req.uid,
                req.subnet_id,
                req.stake,
                req.wallet_hash,
                req.api_endpoint,
                admission.fee,
                now,
            ),
            bond_amount: req.bond,
            bond_locked_until: lock_until,
            permit_active,
            permit_expires_at,
            delegation_enabled: false,
            delegated_amount: 0,
            last_weight_set_time: 0,
        };
        self.attach(*signer, record, &admission, req.bond, now)
    }

    /// Register the caller as a miner of `req.subnet_id`, or move its miner
    /// record there from another subnet.
    pub fn register_miner(
        &mut self,
        signer: &Address,
        req: MinerRegistration,
    ) -> Result<(), RegistryError> {
        let now = self.now();
        let admission = self.check_admission(
            signer,
            &Candidate {
                role: Role::Miner,
                uid: &req.uid,
                api_endpoint: &req.api_endpoint,
                subnet_id: req.subnet_id,
                stake: req.stake,
                bond: 0,
            },
            now,
        )?;

        self.charge_fee(signer, admission.fee, FeeReason::MinerRegistration, now)?;
        self.detach::<MinerInfo>(signer, now);

        let record = MinerInfo {
            node: self.fresh_core(
                req.uid,
                req.subnet_id,
                req.stake,
                req.wallet_hash,
                req.api_endpoint,
                admission.fee,
                now,
            ),
            tasks_completed: 0,
            tasks_failed: 0,
        };
        self.attach(*signer, record, &admission, 0, now)
    }

    /// Every registration precondition, read-only.
    pub(crate) fn check_admission(
        &self,
        signer: &Address,
        candidate: &Candidate<'_>,
        now: u64,
    ) -> Result<Admission, RegistryError> {
        let params = &self.state.params;
        let role = candidate.role;

        check_uid(candidate.uid)?;
        check_endpoint(candidate.api_endpoint)?;
        check_stake(candidate.stake, params)?;
        if role == Role::Validator {
            check_bond(candidate.bond, params)?;
        }
        self.state.permits.check_cooldown(signer, now)?;

        let subnet = self.state.subnets.active(candidate.subnet_id)?;
        if candidate.stake < subnet.min_stake(role) {
            return Err(RegistryError::InsufficientStake);
        }
        if !subnet.has_capacity(role) {
            return Err(limit_exceeded(role));
        }
        if role == Role::Validator
            && subnet.validator_permits_required
            && *signer != self.state.admin
            && !self
                .state
                .permits
                .has_valid_permit(signer, candidate.subnet_id, now)
        {
            return Err(RegistryError::ValidatorPermitRequired);
        }

        let transferred_from = match self.state.registry.core(role, signer) {
            Some(existing) if existing.subnet_id == candidate.subnet_id => {
                return Err(RegistryError::AlreadyRegistered);
            }
            Some(existing) => Some(existing.subnet_id),
            None => {
                let cap = match role {
                    Role::Validator => params.max_validators,
                    Role::Miner => params.max_miners,
                };
                if self.state.registry.count(role) >= cap {
                    return Err(limit_exceeded(role));
                }
                None
            }
        };

        let fee = match role {
            Role::Validator => params.validator_registration_fee,
            Role::Miner => params.miner_registration_fee,
        };
        self.ensure_funds(signer, fee, RegistryError::InsufficientRegistrationFee)?;
        if role == Role::Validator {
            self.ensure_funds(
                signer,
                fee.saturating_add(candidate.bond),
                RegistryError::InsufficientFunds,
            )?;
        }

        Ok(Admission {
            fee,
            transferred_from,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn fresh_core(
        &self,
        uid: Vec<u8>,
        subnet_id: SubnetId,
        stake: u64,
        wallet_hash: Vec<u8>,
        api_endpoint: Vec<u8>,
        fee: u64,
        now: u64,
    ) -> NodeCore {
        let params = &self.state.params;
        NodeCore {
            uid,
            subnet_id,
            stake,
            trust_score: DEFAULT_TRUST_SCORE,
            last_performance: 0,
            accumulated_rewards: 0,
            slashed_amount: 0,
            status: NodeStatus::Active,
            registration_time: now,
            last_active_time: now,
            last_update_time: now,
            api_endpoint,
            wallet_hash,
            weight: DEFAULT_WEIGHT,
            stake_locked_until: deadline(now, params.stake_lock_period),
            consecutive_failures: 0,
            registration_fee_paid: fee,
            immune_until: deadline(now, params.immunity_period),
            recycling_eligible_at: deadline(now, params.recycle_period),
            total_fees_paid: fee,
        }
    }

    /// Insert a freshly built record and account for it everywhere.
    fn attach<T: Stored>(
        &mut self,
        address: Address,
        record: T,
        admission: &Admission,
        bond: u64,
        now: u64,
    ) -> Result<(), RegistryError> {
        let core = record.core();
        let subnet_id = core.subnet_id;
        let stake = core.stake;
        let uid = core.uid.clone();

        T::store_mut(&mut self.state.registry).insert(address, record)?;
        if let Some(subnet) = self.state.subnets.get_mut(subnet_id) {
            subnet.admit(T::ROLE, stake, now);
        }
        let registry = &mut self.state.registry;
        registry.total_stake = registry.total_stake.saturating_add(stake);
        registry.last_update = now;
        let period = self.state.params.registration_cooldown;
        self.state
            .permits
            .start_cooldown(address, T::ROLE, now, period);

        self.emit(RegistryEvent::NodeRegistered {
            address,
            role: T::ROLE,
            uid,
            subnet_id,
            transferred_from: admission.transferred_from,
            stake,
            bond,
            fee_paid: admission.fee,
            timestamp: now,
        });
        match admission.transferred_from {
            Some(from) => tracing::info!(
                "{} {} transferred from subnet {} to subnet {} (stake {})",
                T::ROLE,
                address,
                from,
                subnet_id,
                stake
            ),
            None => tracing::info!(
                "{} {} registered in subnet {} (stake {}, bond {}, fee {})",
                T::ROLE,
                address,
                subnet_id,
                stake,
                bond,
                admission.fee
            ),
        }
        Ok(())
    }
}

fn limit_exceeded(role: Role) -> RegistryError {
    match role {
        Role::Validator => RegistryError::ValidatorLimitExceeded,
        Role::Miner => RegistryError::MinerLimitExceeded,
    }
}
