// crates/moderntensor-core/src/error.rs

use thiserror::Error;

use crate::identity::Address;

/// Failures raised by the underlying ledger's transfer primitive.
///
/// These are fatal from the registry's point of view and are kept distinct
/// from the domain precondition failures in [`RegistryError`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The debited account does not hold enough funds.
    #[error("Insufficient balance for {address}: required {required}, available {available}")]
    InsufficientBalance {
        address: Address,
        required: u64,
        available: u64,
    },

    /// Crediting the target account would overflow its balance.
    #[error("Balance overflow crediting {0}")]
    Overflow(Address),
}

/// Registry-wide error taxonomy.
///
/// Every domain variant is a synchronous precondition failure: the caller has
/// to correct its input or wait for a time-based condition to lapse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Caller is not the network administrator")]
    NotAdmin,

    #[error("Address is already registered in this subnet")]
    AlreadyRegistered,

    #[error("Address is not registered")]
    NotRegistered,

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Insufficient stake")]
    InsufficientStake,

    #[error("Subnet does not exist, is inactive, or does not match")]
    InvalidSubnet,

    #[error("Batch size must be between 1 and 100")]
    BatchSizeExceeded,

    #[error("Invalid status code")]
    InvalidStatus,

    #[error("Stake is locked")]
    StakeLocked,

    #[error("Slashing not allowed: node is already slashed")]
    SlashingNotAllowed,

    #[error("Validator limit exceeded")]
    ValidatorLimitExceeded,

    #[error("Miner limit exceeded")]
    MinerLimitExceeded,

    #[error("Performance out of range")]
    PerformanceOutOfRange,

    #[error("Trust score out of range")]
    TrustScoreOutOfRange,

    #[error("Weight out of range")]
    WeightOutOfRange,

    #[error("Insufficient funds for the registration fee")]
    InsufficientRegistrationFee,

    #[error("Insufficient validator bond")]
    InsufficientValidatorBond,

    #[error("Registration cooldown is active")]
    RegistrationCooldownActive,

    #[error("A valid validator permit is required for this subnet")]
    ValidatorPermitRequired,

    #[error("Immunity period is active")]
    ImmunityPeriodActive,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Weight setting cooldown is active")]
    WeightSettingCooldown,

    #[error("Node is not yet eligible for recycling")]
    RecyclingNotAvailable,

    #[error("Validator bond is locked")]
    ValidatorBondLocked,

    #[error("Insufficient funds for the subnet creation fee")]
    SubnetCreationFeeRequired,

    /// Underlying ledger transfer failure.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl RegistryError {
    /// Stable machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::NotAdmin => "not_admin",
            RegistryError::AlreadyRegistered => "already_registered",
            RegistryError::NotRegistered => "not_registered",
            RegistryError::InvalidParams(_) => "invalid_params",
            RegistryError::InsufficientStake => "insufficient_stake",
            RegistryError::InvalidSubnet => "invalid_subnet",
            RegistryError::BatchSizeExceeded => "batch_size_exceeded",
            RegistryError::InvalidStatus => "invalid_status",
            RegistryError::StakeLocked => "stake_locked",
            RegistryError::SlashingNotAllowed => "slashing_not_allowed",
            RegistryError::ValidatorLimitExceeded => "validator_limit_exceeded",
            RegistryError::MinerLimitExceeded => "miner_limit_exceeded",
            RegistryError::PerformanceOutOfRange => "performance_out_of_range",
            RegistryError::TrustScoreOutOfRange => "trust_score_out_of_range",
            RegistryError::WeightOutOfRange => "weight_out_of_range",
            RegistryError::InsufficientRegistrationFee => "insufficient_registration_fee",
            RegistryError::InsufficientValidatorBond => "insufficient_validator_bond",
            RegistryError::RegistrationCooldownActive => "registration_cooldown_active",
            RegistryError::ValidatorPermitRequired => "validator_permit_required",
            RegistryError::ImmunityPeriodActive => "immunity_period_active",
            RegistryError::InsufficientFunds => "insufficient_funds",
            RegistryError::WeightSettingCooldown => "weight_setting_cooldown",
            RegistryError::RecyclingNotAvailable => "recycling_not_available",
            RegistryError::ValidatorBondLocked => "validator_bond_locked",
            RegistryError::SubnetCreationFeeRequired => "subnet_creation_fee_required",
            RegistryError::Ledger(_) => "ledger_error",
        }
    }

    /// Whether this is an underlying ledger failure rather than a domain rejection.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RegistryError::Ledger(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_error_is_fatal() {
        let err: RegistryError = LedgerError::Overflow(Address::ZERO).into();
        assert!(err.is_fatal());
        assert_eq!(err.code(), "ledger_error");
        assert!(!RegistryError::NotAdmin.is_fatal());
    }

    #[test]
    fn test_codes_are_snake_case() {
        assert_eq!(RegistryError::ValidatorLimitExceeded.code(), "validator_limit_exceeded");
        assert_eq!(
            RegistryError::InvalidParams("x".into()).code(),
            "invalid_params"
        );
    }
}
