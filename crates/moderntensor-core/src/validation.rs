// crates/moderntensor-core/src/validation.rs
//
// Pure validation predicates over fixed-point metrics, amounts, and
// timestamps. No state; every check returns the specific RegistryError that
// the enclosing operation should fail with.

use crate::error::RegistryError;
use crate::params::{EconomicParams, MAX_UID_LEN, SCALE};

pub fn is_valid_performance(performance: u64) -> bool {
    performance <= SCALE
}

pub fn is_valid_trust_score(trust_score: u64) -> bool {
    trust_score <= SCALE
}

pub fn is_valid_weight(weight: u64, params: &EconomicParams) -> bool {
    weight >= params.min_weight && weight <= params.max_weight
}

pub fn check_performance(performance: u64) -> Result<(), RegistryError> {
    if is_valid_performance(performance) {
        Ok(())
    } else {
        Err(RegistryError::PerformanceOutOfRange)
    }
}

pub fn check_trust_score(trust_score: u64) -> Result<(), RegistryError> {
    if is_valid_trust_score(trust_score) {
        Ok(())
    } else {
        Err(RegistryError::TrustScoreOutOfRange)
    }
}

pub fn check_weight(weight: u64, params: &EconomicParams) -> Result<(), RegistryError> {
    if is_valid_weight(weight, params) {
        Ok(())
    } else {
        Err(RegistryError::WeightOutOfRange)
    }
}

/// Stake must lie in `[min_stake, max_stake]`.
pub fn check_stake(stake: u64, params: &EconomicParams) -> Result<(), RegistryError> {
    if stake < params.min_stake {
        return Err(RegistryError::InsufficientStake);
    }
    if stake > params.max_stake {
        return Err(RegistryError::InvalidParams(format!(
            "stake {} exceeds maximum {}",
            stake, params.max_stake
        )));
    }
    Ok(())
}

/// Validator bond must lie in `[min_validator_bond, max_validator_bond]`.
pub fn check_bond(bond: u64, params: &EconomicParams) -> Result<(), RegistryError> {
    if bond < params.min_validator_bond {
        return Err(RegistryError::InsufficientValidatorBond);
    }
    if bond > params.max_validator_bond {
        return Err(RegistryError::InvalidParams(format!(
            "bond {} exceeds maximum {}",
            bond, params.max_validator_bond
        )));
    }
    Ok(())
}

/// Uid must be 1..=64 bytes.
pub fn check_uid(uid: &[u8]) -> Result<(), RegistryError> {
    if uid.is_empty() || uid.len() > MAX_UID_LEN {
        return Err(RegistryError::InvalidParams(format!(
            "uid length {} outside 1..={}",
            uid.len(),
            MAX_UID_LEN
        )));
    }
    Ok(())
}

pub fn check_endpoint(endpoint: &[u8]) -> Result<(), RegistryError> {
    if endpoint.is_empty() {
        return Err(RegistryError::InvalidParams(
            "api endpoint must not be empty".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Time utilities
// ---------------------------------------------------------------------------

/// `now + period`, saturating at `u64::MAX`.
pub fn deadline(now: u64, period: u64) -> u64 {
    now.saturating_add(period)
}

/// Whether `now` has reached `until`.
pub fn has_elapsed(now: u64, until: u64) -> bool {
    now >= until
}

/// Seconds left until `until`, zero once elapsed.
pub fn remaining(now: u64, until: u64) -> u64 {
    until.saturating_sub(now)
}

/// A node is recyclable once it has been inactive strictly longer than the
/// recycle period.
pub fn inactive_beyond(now: u64, last_active: u64, period: u64) -> bool {
    now > deadline(last_active, period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_bounds() {
        assert!(is_valid_performance(0));
        assert!(is_valid_performance(SCALE));
        assert!(!is_valid_performance(SCALE + 1));
        assert_eq!(check_trust_score(SCALE + 1), Err(RegistryError::TrustScoreOutOfRange));
        assert_eq!(check_performance(SCALE + 1), Err(RegistryError::PerformanceOutOfRange));
    }

    #[test]
    fn test_weight_bounds() {
        let params = EconomicParams::default();
        assert!(check_weight(params.min_weight, &params).is_ok());
        assert!(check_weight(params.max_weight, &params).is_ok());
        assert_eq!(
            check_weight(params.min_weight - 1, &params),
            Err(RegistryError::WeightOutOfRange)
        );
        assert_eq!(
            check_weight(params.max_weight + 1, &params),
            Err(RegistryError::WeightOutOfRange)
        );
    }

    #[test]
    fn test_stake_and_bond_ranges() {
        let params = EconomicParams::default();
        assert_eq!(
            check_stake(params.min_stake - 1, &params),
            Err(RegistryError::InsufficientStake)
        );
        assert!(check_stake(params.min_stake, &params).is_ok());
        assert!(matches!(
            check_stake(params.max_stake + 1, &params),
            Err(RegistryError::InvalidParams(_))
        ));
        assert_eq!(
            check_bond(params.min_validator_bond - 1, &params),
            Err(RegistryError::InsufficientValidatorBond)
        );
        assert!(check_bond(params.max_validator_bond, &params).is_ok());
    }

    #[test]
    fn test_uid_and_endpoint() {
        assert!(check_uid(b"a").is_ok());
        assert!(check_uid(&[7u8; 64]).is_ok());
        assert!(check_uid(&[]).is_err());
        assert!(check_uid(&[7u8; 65]).is_err());
        assert!(check_endpoint(b"").is_err());
        assert!(check_endpoint(b"http://node").is_ok());
    }

    #[test]
    fn test_time_helpers() {
        assert_eq!(deadline(u64::MAX - 1, 10), u64::MAX);
        assert!(has_elapsed(10, 10));
        assert!(!has_elapsed(9, 10));
        assert_eq!(remaining(4, 10), 6);
        assert_eq!(remaining(11, 10), 0);
        assert!(!inactive_beyond(200, 100, 100));
        assert!(inactive_beyond(201, 100, 100));
    }
}
