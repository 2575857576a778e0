// crates/moderntensor-core/src/params.rs
//
// Economic parameters for the ModernTensor registry.
//
// All amounts are in octas (1 token = 10^8 octas) and all periods are in
// seconds. Quality metrics (trust, performance, weight) and percentages are
// fixed-point integers scaled by SCALE (10^8 == 1.0).
//
// The defaults below are the testing configuration: fees are very low and
// cooldowns are a few minutes.

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Fixed-point scale: 10^8 represents 1.0 (or 100%).
pub const SCALE: u64 = 100_000_000;

/// Maximum number of entries in one batch update.
pub const MAX_BATCH_SIZE: usize = 100;

/// Maximum length of a node uid in bytes.
pub const MAX_UID_LEN: usize = 64;

/// Trust score seeded at registration (0.5).
pub const DEFAULT_TRUST_SCORE: u64 = 50_000_000;

/// Weight seeded at registration (1.0).
pub const DEFAULT_WEIGHT: u64 = SCALE;

/// Tunable network-wide economic parameters.
///
/// Loaded from the `[economics]` table of the daemon config; any missing
/// field falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomicParams {
    /// Share of every fee that is burned, scaled by SCALE.
    #[serde(default = "default_burn_percentage")]
    pub burn_percentage: u64,
    #[serde(default = "default_miner_registration_fee")]
    pub miner_registration_fee: u64,
    #[serde(default = "default_validator_registration_fee")]
    pub validator_registration_fee: u64,
    #[serde(default = "default_subnet_creation_fee")]
    pub subnet_creation_fee: u64,
    #[serde(default = "default_validator_permit_price")]
    pub validator_permit_price: u64,
    /// Paid to whoever recycles an inactive node.
    #[serde(default = "default_recycling_reward")]
    pub recycling_reward: u64,
    #[serde(default = "default_min_stake")]
    pub min_stake: u64,
    #[serde(default = "default_max_stake")]
    pub max_stake: u64,
    #[serde(default = "default_min_validator_bond")]
    pub min_validator_bond: u64,
    #[serde(default = "default_max_validator_bond")]
    pub max_validator_bond: u64,
    /// Global validator cap across all subnets.
    #[serde(default = "default_max_validators")]
    pub max_validators: u64,
    /// Global miner cap across all subnets.
    #[serde(default = "default_max_miners")]
    pub max_miners: u64,
    #[serde(default = "default_registration_cooldown")]
    pub registration_cooldown: u64,
    #[serde(default = "default_stake_lock_period")]
    pub stake_lock_period: u64,
    #[serde(default = "default_immunity_period")]
    pub immunity_period: u64,
    /// Inactivity window after which a node may be recycled.
    #[serde(default = "default_recycle_period")]
    pub recycle_period: u64,
    /// Lifetime of a validator permit.
    #[serde(default = "default_validator_permit_duration")]
    pub validator_permit_duration: u64,
    #[serde(default = "default_weight_setting_cooldown")]
    pub weight_setting_cooldown: u64,
    #[serde(default = "default_min_weight")]
    pub min_weight: u64,
    #[serde(default = "default_max_weight")]
    pub max_weight: u64,
}

fn default_burn_percentage() -> u64 {
    50_000_000
}

fn default_miner_registration_fee() -> u64 {
    100_000
}

fn default_validator_registration_fee() -> u64 {
    500_000
}

fn default_subnet_creation_fee() -> u64 {
    1_000_000
}

fn default_validator_permit_price() -> u64 {
    200_000
}

fn default_recycling_reward() -> u64 {
    10_000
}

fn default_min_stake() -> u64 {
    1_000_000
}

fn default_max_stake() -> u64 {
    1_000_000_000_000
}

fn default_min_validator_bond() -> u64 {
    1_000_000
}

fn default_max_validator_bond() -> u64 {
    100_000_000_000
}

fn default_max_validators() -> u64 {
    1_000
}

fn default_max_miners() -> u64 {
    10_000
}

fn default_registration_cooldown() -> u64 {
    300
}

fn default_stake_lock_period() -> u64 {
    600
}

fn default_immunity_period() -> u64 {
    300
}

fn default_recycle_period() -> u64 {
    86_400
}

fn default_validator_permit_duration() -> u64 {
    604_800
}

fn default_weight_setting_cooldown() -> u64 {
    60
}

fn default_min_weight() -> u64 {
    1_000_000
}

fn default_max_weight() -> u64 {
    500_000_000
}

impl Default for EconomicParams {
    fn default() -> Self {
        Self {
            burn_percentage: default_burn_percentage(),
            miner_registration_fee: default_miner_registration_fee(),
            validator_registration_fee: default_validator_registration_fee(),
            subnet_creation_fee: default_subnet_creation_fee(),
            validator_permit_price: default_validator_permit_price(),
            recycling_reward: default_recycling_reward(),
            min_stake: default_min_stake(),
            max_stake: default_max_stake(),
            min_validator_bond: default_min_validator_bond(),
            max_validator_bond: default_max_validator_bond(),
            max_validators: default_max_validators(),
            max_miners: default_max_miners(),
            registration_cooldown: default_registration_cooldown(),
            stake_lock_period: default_stake_lock_period(),
            immunity_period: default_immunity_period(),
            recycle_period: default_recycle_period(),
            validator_permit_duration: default_validator_permit_duration(),
            weight_setting_cooldown: default_weight_setting_cooldown(),
            min_weight: default_min_weight(),
            max_weight: default_max_weight(),
        }
    }
}

impl EconomicParams {
    /// Check the parameter set for internal consistency.
    ///
    /// # Errors
    /// Returns `RegistryError::InvalidParams` naming the first offending field.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.burn_percentage > SCALE {
            return Err(RegistryError::InvalidParams(format!(
                "burn_percentage {} exceeds {}",
                self.burn_percentage, SCALE
            )));
        }
        if self.min_stake == 0 || self.min_stake > self.max_stake {
            return Err(RegistryError::InvalidParams(format!(
                "stake range [{}, {}] is empty",
                self.min_stake, self.max_stake
            )));
        }
        if self.min_validator_bond == 0 || self.min_validator_bond > self.max_validator_bond {
            return Err(RegistryError::InvalidParams(format!(
                "validator bond range [{}, {}] is empty",
                self.min_validator_bond, self.max_validator_bond
            )));
        }
        if self.min_weight == 0 || self.min_weight > self.max_weight {
            return Err(RegistryError::InvalidParams(format!(
                "weight range [{}, {}] is empty",
                self.min_weight, self.max_weight
            )));
        }
        if self.max_validators == 0 || self.max_miners == 0 {
            return Err(RegistryError::InvalidParams(
                "global node caps must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
