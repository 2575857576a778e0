// crates/moderntensor-registry/src/call.rs
//
// Transaction dispatch.
//
// `Call` names every mutating entry point with its typed arguments, so a
// signed transaction log can be stored as JSON and replayed through
// `Network::execute`.

use serde::{Deserialize, Serialize};

use moderntensor_core::encoding::text_bytes_vec;
use moderntensor_core::{
    Address, EconomicParams, RegistryError, Role, SubnetId, SubnetLimits, SubnetParams,
};

use crate::batch::NodeUpdateBatch;
use crate::network::Network;
use crate::registration::{MinerRegistration, ValidatorRegistration};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    CreateSubnet {
        subnet_id: SubnetId,
        params: SubnetParams,
    },
    RegisterValidator(ValidatorRegistration),
    RegisterMiner(MinerRegistration),
    PurchaseValidatorPermit {
        subnet_id: SubnetId,
    },
    GrantValidatorPermit {
        validator: Address,
        subnet_id: SubnetId,
    },
    ResetRegistrationCooldown {
        address: Address,
    },
    RecycleNode {
        address: Address,
        role: Role,
    },
    SetValidatorWeights {
        subnet_id: SubnetId,
        #[serde(with = "text_bytes_vec")]
        miner_uids: Vec<Vec<u8>>,
        weights: Vec<u64>,
    },
    WithdrawValidatorBond,
    BatchUpdateMiners(NodeUpdateBatch),
    BatchUpdateValidators(NodeUpdateBatch),
    SlashValidator {
        address: Address,
        percentage: u64,
        reason: String,
    },
    SlashMiner {
        address: Address,
        percentage: u64,
        reason: String,
    },
    DeregisterValidator {
        subnet_id: SubnetId,
    },
    DeregisterMiner {
        subnet_id: SubnetId,
    },
    AddValidatorStake {
        amount: u64,
    },
    AddMinerStake {
        amount: u64,
    },
    WithdrawValidatorStake {
        amount: u64,
    },
    WithdrawMinerStake {
        amount: u64,
    },
    UpdateGlobalParams {
        params: EconomicParams,
    },
    UpdateSubnetParams {
        subnet_id: SubnetId,
        limits: SubnetLimits,
    },
    DisableSubnetPermitRequirement {
        subnet_id: SubnetId,
    },
    SetSubnetStatus {
        subnet_id: SubnetId,
        active: bool,
    },
    EmergencyPause,
    EmergencyUnpause,
    DistributeRewards {
        subnet_id: SubnetId,
        amount: u64,
    },
    ClaimRewards {
        role: Role,
    },
}

impl Call {
    /// Operation name, as it appears in the `op` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Call::CreateSubnet { .. } => "create_subnet",
            Call::RegisterValidator(_) => "register_validator",
            Call::RegisterMiner(_) => "register_miner",
            Call::PurchaseValidatorPermit { .. } => "purchase_validator_permit",
            Call::GrantValidatorPermit { .. } => "grant_validator_permit",
            Call::ResetRegistrationCooldown { .. } => "reset_registration_cooldown",
            Call::RecycleNode { .. } => "recycle_node",
            Call::SetValidatorWeights { .. } => "set_validator_weights",
            Call::WithdrawValidatorBond => "withdraw_validator_bond",
            Call::BatchUpdateMiners(_) => "batch_update_miners",
            Call::BatchUpdateValidators(_) => "batch_update_validators",
            Call::SlashValidator { .. } => "slash_validator",
            Call::SlashMiner { .. } => "slash_miner",
            Call::DeregisterValidator { .. } => "deregister_validator",
            Call::DeregisterMiner { .. } => "deregister_miner",
            Call::AddValidatorStake { .. } => "add_validator_stake",
            Call::AddMinerStake { .. } => "add_miner_stake",
            Call::WithdrawValidatorStake { .. } => "withdraw_validator_stake",
            Call::WithdrawMinerStake { .. } => "withdraw_miner_stake",
            Call::UpdateGlobalParams { .. } => "update_global_params",
            Call::UpdateSubnetParams { .. } => "update_subnet_params",
            Call::DisableSubnetPermitRequirement { .. } => "disable_subnet_permit_requirement",
            Call::SetSubnetStatus { .. } => "set_subnet_status",
            Call::EmergencyPause => "emergency_pause",
            Call::EmergencyUnpause => "emergency_unpause",
            Call::DistributeRewards { .. } => "distribute_rewards",
            Call::ClaimRewards { .. } => "claim_rewards",
        }
    }
}

/// A call together with the identity that authorized it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCall {
    pub signer: Address,
    pub call: Call,
}

impl Network {
    /// Run one call as `signer`. On failure nothing is committed and no
    /// events are kept.
    pub fn execute(&mut self, signer: &Address, call: Call) -> Result<(), RegistryError> {
        let name = call.name();
        let result = self.transact(|network| network.dispatch(signer, call));
        match &result {
            Ok(()) => tracing::debug!("Executed {} for {}", name, signer),
            Err(e) => tracing::debug!("Rejected {} for {}: {} ({})", name, signer, e, e.code()),
        }
        result
    }

    fn dispatch(&mut self, signer: &Address, call: Call) -> Result<(), RegistryError> {
        match call {
            Call::CreateSubnet { subnet_id, params } => {
                self.create_subnet(signer, subnet_id, params)?;
            }
            Call::RegisterValidator(req) => self.register_validator(signer, req)?,
            Call::RegisterMiner(req) => self.register_miner(signer, req)?,
            Call::PurchaseValidatorPermit { subnet_id } => {
                self.purchase_validator_permit(signer, subnet_id)?;
            }
            Call::GrantValidatorPermit {
                validator,
                subnet_id,
            } => {
                self.grant_validator_permit(signer, &validator, subnet_id)?;
            }
            Call::ResetRegistrationCooldown { address } => {
                self.reset_registration_cooldown(signer, &address)?
            }
            Call::RecycleNode { address, role } => {
                self.recycle_node(signer, &address, role)?;
            }
            Call::SetValidatorWeights {
                subnet_id,
                miner_uids,
                weights,
            } => self.set_validator_weights(signer, subnet_id, miner_uids, weights)?,
            Call::WithdrawValidatorBond => {
                self.withdraw_validator_bond(signer)?;
            }
            Call::BatchUpdateMiners(batch) => {
                self.batch_update_miners(signer, &batch)?;
            }
            Call::BatchUpdateValidators(batch) => {
                self.batch_update_validators(signer, &batch)?;
            }
            Call::SlashValidator {
                address,
                percentage,
                reason,
            } => {
                self.slash_validator(signer, &address, percentage, reason)?;
            }
            Call::SlashMiner {
                address,
                percentage,
                reason,
            } => {
                self.slash_miner(signer, &address, percentage, reason)?;
            }
            Call::DeregisterValidator { subnet_id } => {
                self.deregister_validator(signer, subnet_id)?
            }
            Call::DeregisterMiner { subnet_id } => self.deregister_miner(signer, subnet_id)?,
            Call::AddValidatorStake { amount } => {
                self.add_validator_stake(signer, amount)?;
            }
            Call::AddMinerStake { amount } => {
                self.add_miner_stake(signer, amount)?;
            }
            Call::WithdrawValidatorStake { amount } => {
                self.withdraw_validator_stake(signer, amount)?;
            }
            Call::WithdrawMinerStake { amount } => {
                self.withdraw_miner_stake(signer, amount)?;
            }
            Call::UpdateGlobalParams { params } => self.update_global_params(signer, params)?,
            Call::UpdateSubnetParams { subnet_id, limits } => {
                self.update_subnet_params(signer, subnet_id, limits)?
            }
            Call::DisableSubnetPermitRequirement { subnet_id } => {
                self.disable_subnet_permit_requirement(signer, subnet_id)?
            }
            Call::SetSubnetStatus { subnet_id, active } => {
                self.set_subnet_status(signer, subnet_id, active)?
            }
            Call::EmergencyPause => self.emergency_pause(signer)?,
            Call::EmergencyUnpause => self.emergency_unpause(signer)?,
            Call::DistributeRewards { subnet_id, amount } => {
                self.distribute_rewards(signer, subnet_id, amount)?;
            }
            Call::ClaimRewards { role } => {
                self.claim_rewards(signer, role)?;
            }
        }
        Ok(())
    }
}
